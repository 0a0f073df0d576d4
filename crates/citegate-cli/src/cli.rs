//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Citegate - verify the citations in an AI-drafted motion before delivery.
#[derive(Debug, Parser)]
#[command(name = "citegate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CITEGATE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (gate decision only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full verification pipeline over a draft
    Verify(VerifyArgs),

    /// Normalize and de-duplicate citation strings
    Normalize(NormalizeArgs),

    /// Validate ellipses in a quotation against its source
    CheckQuote(CheckQuoteArgs),
}

/// Arguments for the verify command.
#[derive(Debug, Clone, clap::Args)]
pub struct VerifyArgs {
    /// Draft text file
    #[arg(short, long)]
    pub draft: PathBuf,

    /// Extracted citations: eyecite JSON output, or a JSON array of strings
    #[arg(long)]
    pub citations: PathBuf,

    /// Research context JSON (findings per citation, adverse candidates)
    #[arg(long)]
    pub research: Option<PathBuf>,

    /// Assertions JSON (proposition and quoted text per citation)
    #[arg(long)]
    pub assertions: Option<PathBuf>,

    /// Answer lookups from a JSON fixture instead of CourtListener
    #[arg(long)]
    pub authorities: Option<PathBuf>,

    /// Audit tier label
    #[arg(long, default_value = "standard")]
    pub tier: String,

    /// Audit phase label
    #[arg(long, default_value = "draft")]
    pub phase: String,

    /// Pipeline preset, overriding the [pipeline] config section
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,
}

/// Pipeline presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PresetArg {
    /// Defaults
    Standard,
    /// Small batches, no secondary lookups
    Aggressive,
    /// Large batches, long deadlines
    Lenient,
}

/// Arguments for the normalize command.
#[derive(Debug, Clone, clap::Args)]
pub struct NormalizeArgs {
    /// Citation strings, in document order
    pub citations: Vec<String>,

    /// Read citation strings from stdin, one per line
    #[arg(long, conflicts_with = "citations")]
    pub stdin: bool,
}

/// Arguments for the check-quote command.
#[derive(Debug, Clone, clap::Args)]
pub struct CheckQuoteArgs {
    /// Quoted passage as it appears in the draft
    #[arg(short, long)]
    pub quote: String,

    /// Source opinion text
    #[arg(short, long, conflicts_with = "source_file")]
    pub source: Option<String>,

    /// File holding the source opinion text
    #[arg(long)]
    pub source_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_command() {
        let cli = Cli::parse_from([
            "citegate",
            "verify",
            "--draft",
            "motion.txt",
            "--citations",
            "cites.json",
            "--preset",
            "aggressive",
        ]);
        match cli.command {
            Command::Verify(args) => {
                assert_eq!(args.draft, PathBuf::from("motion.txt"));
                assert_eq!(args.tier, "standard");
                assert_eq!(args.phase, "draft");
                assert_eq!(args.preset, Some(PresetArg::Aggressive));
                assert!(args.authorities.is_none());
            }
            _ => panic!("Expected Verify command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["citegate", "normalize", "1 F.3d 2", "--format", "json", "--no-color"]);
        assert_eq!(cli.format, Some(CliFormat::Json));
        assert!(cli.no_color);
        match cli.command {
            Command::Normalize(args) => assert_eq!(args.citations, vec!["1 F.3d 2"]),
            _ => panic!("Expected Normalize command"),
        }
    }

    #[test]
    fn test_check_quote_source_conflict() {
        let result = Cli::try_parse_from([
            "citegate",
            "check-quote",
            "--quote",
            "a ... b",
            "--source",
            "a c b",
            "--source-file",
            "op.txt",
        ]);
        assert!(result.is_err());
    }
}
