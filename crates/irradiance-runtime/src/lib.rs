//! Runtime layer for the irradiance pipeline.
//!
//! Owns the per-session [`pipeline::PipelineContext`] and exports its derived
//! tables to disk.

pub mod export;
pub mod pipeline;

pub use irradiance_core as core;
pub use irradiance_data as data;
