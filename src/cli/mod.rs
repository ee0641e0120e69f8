//! CLI module for stackfile
//!
//! Provides command-line interface for:
//! - write: Push a payload through the configured pipeline
//! - read: Pull it back out
//! - describe: Show the stage chain
//! - demo: Round-trip a sample payload

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{demo, describe, read, run, run_command, write};
pub use errors::{CliError, CliResult};
