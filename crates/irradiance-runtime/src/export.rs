//! Writes every computed table of a session to a directory.
//!
//! Produces one `<name>.csv` per table from [`PipelineContext::tables`] plus a
//! `manifest.json` describing what was written.

use std::path::{Path, PathBuf};

use chrono::Utc;
use irradiance_core::error::{IrradianceError, Result};
use irradiance_data::export::write_csv_file;
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineContext;

pub const MANIFEST_FILE: &str = "manifest.json";

/// One file written by [`export_session`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedTable {
    pub name: String,
    pub title: String,
    pub file: String,
    pub rows: usize,
}

/// Summary of an export, also written as `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportManifest {
    /// RFC 3339 timestamp of the export.
    pub generated_at: String,
    pub include_index: bool,
    /// Distinct years in the hourly source, `None` when it is not loaded.
    pub distinct_years: Option<usize>,
    /// Reason the adjustment is missing, if it is.
    pub adjustment_note: Option<String>,
    pub tables: Vec<ExportedTable>,
}

/// Export all computed tables of `ctx` into `dir`, creating it if needed.
pub fn export_session(ctx: &PipelineContext, dir: &Path, include_index: bool) -> Result<ExportManifest> {
    std::fs::create_dir_all(dir).map_err(|source| IrradianceError::FileAccess {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut tables = Vec::new();
    for named in ctx.tables() {
        let file = format!("{}.csv", named.name);
        write_csv_file(&named.table, &dir.join(&file), include_index)?;
        tables.push(ExportedTable {
            name: named.name.to_string(),
            title: named.title.to_string(),
            file,
            rows: named.table.len(),
        });
    }

    let manifest = ExportManifest {
        generated_at: Utc::now().to_rfc3339(),
        include_index,
        distinct_years: ctx.distinct_years(),
        adjustment_note: ctx.adjustment_error().map(|e| e.to_string()),
        tables,
    };

    let manifest_path: PathBuf = dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(&manifest_path, json).map_err(|source| IrradianceError::FileAccess {
        path: manifest_path.clone(),
        source,
    })?;

    tracing::info!(
        tables = manifest.tables.len(),
        dir = %dir.display(),
        "session exported"
    );

    Ok(manifest)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
