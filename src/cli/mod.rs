//! CLI command handlers
//!
//! This module contains all CLI-related functionality including:
//! - Argument parsing structures
//! - Command implementations
//! - Routing of parsed commands to their handlers

pub mod args;
pub mod commands;
pub mod router;

pub use args::{Cli, Commands, OutputFormat, StepsCommand, WindowArgs};
pub use router::execute_command;
