mod bootstrap;

use anyhow::Result;
use irradiance_core::error::IrradianceError;
use irradiance_core::formatting::render_table;
use irradiance_core::settings::Settings;
use irradiance_runtime::export::export_session;
use irradiance_runtime::pipeline::PipelineContext;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("Irradiance Adjust v{} starting", env!("CARGO_PKG_VERSION"));

    let mut ctx = PipelineContext::new(settings.schema())?;
    tracing::info!(
        "Irradiance column prefix: {}, flux divisor: {}",
        ctx.schema().irradiance_prefix,
        ctx.schema().flux_divisor
    );

    // Each source is loaded on its own; a failure in one never blocks the other.
    let hourly = bootstrap::read_upload(settings.hourly.as_deref())
        .and_then(|bytes| ctx.load_hourly(bytes.as_deref()));
    report_source("NASA/POWER hourly CSV", settings.hourly.is_some(), hourly);

    let monthly = bootstrap::read_upload(settings.monthly.as_deref())
        .and_then(|bytes| ctx.load_monthly(bytes.as_deref()));
    report_source("Monthly H_Gh report", settings.monthly.is_some(), monthly);

    if let Some(years) = ctx.distinct_years() {
        println!("Total number of years in the dataset: {}\n", years);
    }

    if !settings.quiet {
        for named in ctx.tables() {
            println!("{}", render_table(named.title, &named.table, settings.decimals));
        }
    }

    if let Some(err) = ctx.adjustment_error() {
        println!("Adjusted GHI not computed: {}", err);
    }

    if let Some(dir) = &settings.output_dir {
        let manifest = export_session(&ctx, dir, settings.include_index)?;
        println!(
            "Wrote {} tables to {}",
            manifest.tables.len(),
            dir.display()
        );
    }

    Ok(())
}

/// Tell the user what happened to one source.
fn report_source(label: &str, supplied: bool, outcome: std::result::Result<(), IrradianceError>) {
    match outcome {
        Ok(()) if supplied => tracing::info!("{}: loaded", label),
        Ok(()) => println!("{}: not supplied", label),
        Err(e) => eprintln!("{}: {}", label, e),
    }
}
