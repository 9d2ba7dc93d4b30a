use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{IrradianceError, Result};

/// Column-name prefix of the irradiance flux column in hourly exports.
pub const DEFAULT_IRRADIANCE_PREFIX: &str = "ALLSKY_SFC_";

/// Divisor turning raw hourly flux into GHI (Wh/m² → kWh/m²).
pub const DEFAULT_FLUX_DIVISOR: f64 = 1000.0;

// ── SchemaConfig ───────────────────────────────────────────────────────────────

/// Data-provider schema constants that drive hourly parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Prefix identifying the irradiance column, e.g. `ALLSKY_SFC_`.
    pub irradiance_prefix: String,
    /// Raw flux is divided by this value to obtain GHI.
    pub flux_divisor: f64,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            irradiance_prefix: DEFAULT_IRRADIANCE_PREFIX.to_string(),
            flux_divisor: DEFAULT_FLUX_DIVISOR,
        }
    }
}

impl SchemaConfig {
    /// Reject values the hourly parser cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.irradiance_prefix.trim().is_empty() {
            return Err(IrradianceError::Config(
                "irradiance column prefix must not be empty".to_string(),
            ));
        }
        if !(self.flux_divisor.is_finite() && self.flux_divisor > 0.0) {
            return Err(IrradianceError::Config(format!(
                "flux divisor must be a positive number, got {}",
                self.flux_divisor
            )));
        }
        Ok(())
    }
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Adjust hourly NASA/POWER irradiance with a monthly reference report
#[derive(Parser, Debug, Clone)]
#[command(
    name = "irradiance-adjust",
    about = "Adjust hourly NASA/POWER irradiance with a monthly reference report",
    version
)]
pub struct Settings {
    /// NASA/POWER hourly CSV export
    #[arg(long)]
    pub hourly: Option<PathBuf>,

    /// Monthly report containing a `Month H_Gh ...` table
    #[arg(long)]
    pub monthly: Option<PathBuf>,

    /// Directory to write every computed table to as CSV
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Write a leading index column in exported CSV files
    #[arg(long)]
    pub include_index: bool,

    /// Prefix of the irradiance column in the hourly export
    #[arg(long, default_value = DEFAULT_IRRADIANCE_PREFIX)]
    pub irradiance_prefix: String,

    /// Divisor applied to raw flux to obtain GHI
    #[arg(long, default_value_t = DEFAULT_FLUX_DIVISOR)]
    pub flux_divisor: f64,

    /// Decimal places used when printing tables
    #[arg(long, default_value = "3")]
    pub decimals: usize,

    /// Do not print tables to stdout
    #[arg(long)]
    pub quiet: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] but with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Schema constants selected on the command line.
    pub fn schema(&self) -> SchemaConfig {
        SchemaConfig {
            irradiance_prefix: self.irradiance_prefix.clone(),
            flux_divisor: self.flux_divisor,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::load_from_args(["irradiance-adjust"]);

        assert!(settings.hourly.is_none());
        assert!(settings.monthly.is_none());
        assert!(settings.output_dir.is_none());
        assert!(!settings.include_index);
        assert_eq!(settings.irradiance_prefix, "ALLSKY_SFC_");
        assert!((settings.flux_divisor - 1000.0).abs() < f64::EPSILON);
        assert_eq!(settings.decimals, 3);
        assert!(!settings.quiet);
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_cli_paths() {
        let settings = Settings::load_from_args([
            "irradiance-adjust",
            "--hourly",
            "/data/power.csv",
            "--monthly",
            "/data/report.txt",
            "--output-dir",
            "/tmp/out",
            "--include-index",
        ]);
        assert_eq!(settings.hourly, Some(PathBuf::from("/data/power.csv")));
        assert_eq!(settings.monthly, Some(PathBuf::from("/data/report.txt")));
        assert_eq!(settings.output_dir, Some(PathBuf::from("/tmp/out")));
        assert!(settings.include_index);
    }

    #[test]
    fn test_settings_debug_overrides_log_level() {
        let settings =
            Settings::load_from_args(["irradiance-adjust", "--log-level", "ERROR", "--debug"]);
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_settings_schema_from_cli() {
        let settings = Settings::load_from_args([
            "irradiance-adjust",
            "--irradiance-prefix",
            "CLRSKY_SFC_",
            "--flux-divisor",
            "3600",
        ]);
        let schema = settings.schema();
        assert_eq!(schema.irradiance_prefix, "CLRSKY_SFC_");
        assert!((schema.flux_divisor - 3600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_schema_default_is_valid() {
        let schema = SchemaConfig::default();
        assert_eq!(schema.irradiance_prefix, DEFAULT_IRRADIANCE_PREFIX);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_schema_rejects_zero_divisor() {
        let schema = SchemaConfig {
            flux_divisor: 0.0,
            ..Default::default()
        };
        assert!(matches!(schema.validate(), Err(IrradianceError::Config(_))));
    }

    #[test]
    fn test_schema_rejects_empty_prefix() {
        let schema = SchemaConfig {
            irradiance_prefix: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(schema.validate(), Err(IrradianceError::Config(_))));
    }

    #[test]
    fn test_schema_serde_round_trip_field_names() {
        let json = serde_json::to_value(SchemaConfig::default()).unwrap();
        assert_eq!(json["irradiance_prefix"], "ALLSKY_SFC_");
        assert_eq!(json["flux_divisor"], 1000.0);
    }
}
