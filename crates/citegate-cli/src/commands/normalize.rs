//! Normalize command implementation.

use crate::cli::NormalizeArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use citegate_domain::CitationType;
use citegate_extractor::{classify, deduplicate};
use std::io::BufRead;

/// Execute the normalize command.
///
/// Statutory citations are set aside before de-duplication and reported
/// separately.
pub fn execute_normalize(args: NormalizeArgs, formatter: &Formatter) -> Result<()> {
    let input = if args.stdin {
        read_lines(std::io::stdin().lock())?
    } else {
        args.citations
    };
    if input.is_empty() {
        return Err(CliError::InvalidInput("no citation strings given".into()));
    }

    let (statutes, cases): (Vec<String>, Vec<String>) =
        input.into_iter().partition(|s| classify(s) == CitationType::Statute);

    let result = deduplicate(&cases);
    println!("{}", formatter.format_normalization(&result)?);
    if !statutes.is_empty() {
        eprintln!(
            "{}",
            formatter.info(&format!("{} statutory citation(s) excluded", statutes.len()))
        );
    }
    Ok(())
}

/// Non-blank trimmed lines from a reader.
pub fn read_lines(reader: impl BufRead) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }
    Ok(lines)
}
