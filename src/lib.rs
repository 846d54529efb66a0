//! # turbo-health
//!
//! Pipeline health for the Turbo Telescope image-processing pipeline.
//!
//! ## Usage
//!
//! ```bash
//! turbo-health decode science_turbo_production_pipeline_3_1_2024_4_15_0
//! turbo-health aggregate -i runs.json --unit hours --include-empty-buckets
//! ```
//!
//! ## Modules
//!
//! - `domain` - Schema names, pipeline steps, file paths and run records
//! - `analytics` - Time bucketing, per-bucket statistics and run totals
//! - `source` - Where run rows come from (files, memory)
//! - `config` - Dashboard configuration from TOML and the environment
//! - `cli` - Argument parsing and command handlers
//! - `error` - Error types shared by the library
pub mod analytics;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod source;

#[cfg(test)]
mod property_tests;

pub use error::{Error, Result};
