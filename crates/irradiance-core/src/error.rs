use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the irradiance pipeline.
///
/// Every variant is recoverable: the shell reports it as a message and the
/// failing source's derived state is reset, nothing else is touched.
#[derive(Error, Debug)]
pub enum IrradianceError {
    /// The start marker of the embedded table was never found.
    #[error("Could not find the data header ({0})")]
    HeaderNotFound(String),

    /// The table header was found but no data rows follow it.
    #[error("Table is empty: header found but no data rows")]
    EmptyTable,

    /// One or more required columns are absent from the table header.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumn(Vec<String>),

    /// The raw bytes could not be decoded as text.
    #[error("Failed to decode input: {0}")]
    DecodeError(String),

    /// Every row was dropped during numeric coercion and cleaning.
    #[error("No valid data rows remain after cleaning")]
    EmptyAfterCleaning,

    /// The adjustment needs both sources and at least one of them is absent.
    #[error("Insufficient inputs: {0}")]
    InsufficientInputs(String),

    /// A delimited row could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be produced.
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A file could not be read from or written to disk.
    #[error("Failed to access file {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the irradiance crates.
pub type Result<T> = std::result::Result<T, IrradianceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_header_not_found() {
        let err = IrradianceError::HeaderNotFound("YEAR,MO,DY,HR".to_string());
        assert_eq!(err.to_string(), "Could not find the data header (YEAR,MO,DY,HR)");
    }

    #[test]
    fn test_error_display_missing_single_column() {
        let err = IrradianceError::MissingColumn(vec!["YEAR".to_string()]);
        assert_eq!(err.to_string(), "Missing required columns: YEAR");
    }

    #[test]
    fn test_error_display_missing_several_columns() {
        let err = IrradianceError::MissingColumn(vec![
            "ALLSKY_SFC_*".to_string(),
            "YEAR".to_string(),
            "MO".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required columns: ALLSKY_SFC_*, YEAR, MO"
        );
    }

    #[test]
    fn test_error_display_empty_after_cleaning() {
        let err = IrradianceError::EmptyAfterCleaning;
        assert_eq!(err.to_string(), "No valid data rows remain after cleaning");
    }

    #[test]
    fn test_error_display_file_access() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = IrradianceError::FileAccess {
            path: PathBuf::from("/data/hourly.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to access file"));
        assert!(msg.contains("/data/hourly.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_config() {
        let err = IrradianceError::Config("flux divisor must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: flux divisor must be positive"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: IrradianceError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
