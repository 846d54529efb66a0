//! Pipeline domain types
//!
//! - `schema_name` - run schema names and the Chicago-time timestamp codec
//! - `pipeline_step` - canonical steps and their historical literals
//! - `file_path` - validated raw image paths
//! - `record` - per-image step records

pub mod file_path;
pub mod pipeline_step;
pub mod record;
pub mod schema_name;

pub use file_path::{FilePath, FilterBand};
pub use pipeline_step::{PipelineStep, StepName, STEP_ALIASES};
pub use record::{RawRunRow, RunRecord};
pub use schema_name::{decode, encode, DatasetKind, Machine, SchemaName, SCHEMA_ZONE, SCHEMA_ZONE_NAME};
