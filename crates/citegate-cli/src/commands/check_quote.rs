//! Check-quote command implementation.

use crate::cli::CheckQuoteArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use citegate_gatekeeper::{quote_found_in_source, validate_ellipsis};
use std::fs;

/// Execute the check-quote command; returns whether the quotation is valid.
pub fn execute_check_quote(args: CheckQuoteArgs, config: &Config, formatter: &Formatter) -> Result<bool> {
    let source = match (args.source, args.source_file) {
        (Some(text), _) => Some(text),
        (None, Some(path)) => Some(fs::read_to_string(path)?),
        (None, None) => None,
    };

    let result = validate_ellipsis(&args.quote, source.as_deref(), &config.validation);
    let found = source.as_deref().map(|s| quote_found_in_source(&args.quote, s));

    println!("{}", formatter.format_ellipsis(&result, found)?);
    Ok(result.valid && found != Some(false))
}
