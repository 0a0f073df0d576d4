//! Citegate CLI library.
//!
//! Configuration loading, command execution and output formatting for the
//! `citegate` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, CliFormat, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;

/// Exit code when the hard gate (or a quote check) fails
pub const EXIT_GATE_FAILED: i32 = 2;
