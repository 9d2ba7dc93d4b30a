//! Shared types for the irradiance adjustment pipeline.
//!
//! Holds the row models produced at each stage, the error taxonomy, the
//! command-line settings and the generic [`table::Table`] used for rendering
//! and export.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod table;

pub use error::{IrradianceError, Result};
