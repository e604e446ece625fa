//! CLI module for clasificar
//!
//! This module contains all CLI command handlers and utilities.

mod args;
mod commands;
mod logging;

pub use args::{Cli, Command, InspectArgs, OutputFormat, RunArgs};
pub use commands::run_command;
pub use logging::LogLevel;
