//! Data layer for the irradiance pipeline.
//!
//! Extracts the embedded tables from both sources, parses and cleans their
//! rows, builds the monthly aggregation views, applies the ratio adjustment
//! and serializes any derived table to CSV.

pub mod adjuster;
pub mod aggregator;
pub mod decode;
pub mod export;
pub mod extractor;
pub mod hourly;
pub mod monthly;
pub mod numeric;

pub use irradiance_core as core;
