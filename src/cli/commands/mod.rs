//! Command implementation modules
//!
//! Each command lives in its own module; handlers print to stdout and return
//! `anyhow::Result` so the binary can report failures uniformly.

pub mod aggregate;
pub mod codec;
pub mod steps;
pub mod watch;

pub use aggregate::{run_aggregate, run_tables, run_totals, AggregateOptions};
pub use codec::{run_decode, run_encode, run_log_url};
pub use steps::{run_steps_check, run_steps_list};
pub use watch::run_watch;
