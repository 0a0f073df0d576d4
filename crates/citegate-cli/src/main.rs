//! Citegate CLI - verify the citations in an AI-drafted motion.
//!
//! Exit status: 0 when the draft passes the hard gate (or the quote is
//! valid), 2 when it does not, 1 on any error.

use citegate_cli::commands;
use citegate_cli::config::OutputFormat;
use citegate_cli::{Cli, CliFormat, Command, Config, Formatter, EXIT_GATE_FAILED};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    // Log to stderr so JSON output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> citegate_cli::Result<i32> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let format = match cli.format {
        Some(CliFormat::Table) => OutputFormat::Table,
        Some(CliFormat::Json) => OutputFormat::Json,
        Some(CliFormat::Quiet) => OutputFormat::Quiet,
        None => config.settings.format,
    };
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Verify(args) => commands::execute_verify(args, &config, &formatter),
        Command::Normalize(args) => {
            commands::execute_normalize(args, &formatter)?;
            Ok(0)
        }
        Command::CheckQuote(args) => {
            let valid = commands::execute_check_quote(args, &config, &formatter)?;
            Ok(if valid { 0 } else { EXIT_GATE_FAILED })
        }
    }
}
