//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use citegate_domain::EllipsisValidationResult;
use citegate_extractor::DeduplicationResult;
use citegate_pipeline::{PipelineOutput, VerificationRate};
use colored::*;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a pipeline run.
    pub fn format_output(&self, output: &PipelineOutput) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(output)?),
            OutputFormat::Table => Ok(self.format_output_table(output)),
            OutputFormat::Quiet => Ok(self.gate_line(output)),
        }
    }

    fn format_output_table(&self, output: &PipelineOutput) -> String {
        let mut sections = Vec::new();

        if let Some(error) = &output.error {
            sections.push(self.error(&format!("Run failed closed: {}", error)));
        } else if output.results.is_empty() {
            sections.push(self.colorize("No case citations found.", "yellow"));
        } else {
            let mut builder = Builder::default();
            builder.push_record(["#", "Citation", "Type", "Lookup", "Status", "Strength", "Flags"]);

            for (i, result) in output.results.iter().enumerate() {
                let record = &result.record;
                let strength = record
                    .strength_score
                    .as_ref()
                    .map(|s| s.rating.as_str().to_string())
                    .unwrap_or_else(|| "-".to_string());
                let flags = if record.flags.is_empty() {
                    "-".to_string()
                } else {
                    record
                        .flags
                        .iter()
                        .map(|f| f.flag_type.as_str().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                builder.push_record([
                    (i + 1).to_string(),
                    record.citation.clone(),
                    record.citation_type.as_str().to_string(),
                    label(&result.lookup),
                    label(&result.status),
                    strength,
                    flags,
                ]);
            }

            let mut table = builder.build();
            table
                .with(Style::rounded())
                .with(Modify::new(Rows::first()).with(Alignment::center()));
            sections.push(table.to_string());
        }

        sections.push(self.summary_block(output));

        for check in &output.unaddressed_adverse {
            sections.push(self.warning(&format!(
                "Adverse authority not addressed: {} ({})",
                check.short_case_name, check.citation
            )));
        }
        for error in &output.batch_errors {
            sections.push(self.warning(&format!("Lookup failed for [{}]: {}", error.text_block, error.error)));
        }

        sections.push(self.gate_line(output));
        sections.join("\n")
    }

    fn summary_block(&self, output: &PipelineOutput) -> String {
        let s = &output.summary;
        let rate = match output.verification_rate {
            VerificationRate::Percent(p) => format!("{:.1}%", p),
            VerificationRate::Error => "ERROR".to_string(),
        };
        let holdings = s
            .holding_mismatches
            .map(|n| n.to_string())
            .unwrap_or_else(|| "not checked".to_string());

        let mut lines = vec![
            format!("Run: {}", output.run_id),
            format!(
                "Citations: {} total, {} verified, {} flagged, {} removed, {} critical",
                s.total, s.verified, s.flagged, s.removed, s.critical
            ),
            format!("Verification rate: {}", rate),
            format!(
                "Normalization: {} in, {} unique, {} duplicates, {} incomplete",
                output.normalization.input_count,
                output.normalization.unique_count,
                output.normalization.duplicate_count,
                output.normalization.incomplete_count
            ),
            format!(
                "Shorthand: {} resolved, {} unresolved",
                output.resolution_stats.total_resolved(),
                output.resolution_stats.total_unresolved()
            ),
            format!(
                "Holding mismatches: {}, quotes not found: {}, ellipsis errors: {}",
                holdings, s.quotes_not_found, s.ellipsis_errors
            ),
            format!(
                "Adverse authorities: {} ({} unaddressed)",
                output.adverse_authorities.len(),
                output.unaddressed_adverse.len()
            ),
            format!("Lookup cost: {} this run, {} this session", output.run_cost, output.session_cost),
        ];
        if output.revision_required {
            lines.push(self.colorize("Revision required", "yellow"));
        }
        lines.join("\n")
    }

    fn gate_line(&self, output: &PipelineOutput) -> String {
        if output.passes_hard_gate {
            self.success("PASS: no critical flags")
        } else if output.is_fail_closed() {
            self.error("FAIL: verification could not complete")
        } else {
            let blocking: Vec<&str> = output.blocking().map(|r| r.record.citation.as_str()).collect();
            self.error(&format!("FAIL: critical flags on {}", blocking.join(", ")))
        }
    }

    /// Format a normalization pass.
    pub fn format_normalization(&self, result: &DeduplicationResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Quiet => Ok(result.unique.join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Citation", "Outcome", "Note"]);
                for citation in &result.unique {
                    builder.push_record([citation.as_str(), "kept", ""]);
                }
                for dup in &result.duplicates_removed {
                    let note = dup
                        .duplicate_of
                        .as_deref()
                        .map(|of| format!("duplicate of {}", of))
                        .unwrap_or_default();
                    builder.push_record([dup.raw.clone(), "removed".to_string(), note]);
                }
                for incomplete in &result.incomplete_removed {
                    builder.push_record([incomplete.raw.as_str(), "removed", "incomplete"]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                let stats = &result.stats;
                Ok(format!(
                    "{}\n{}",
                    table,
                    self.info(&format!(
                        "{} in, {} unique, {} duplicates, {} incomplete",
                        stats.input_count, stats.unique_count, stats.duplicate_count, stats.incomplete_count
                    ))
                ))
            }
        }
    }

    /// Format an ellipsis validation; `found` is the quote-in-source check.
    pub fn format_ellipsis(&self, result: &EllipsisValidationResult, found: Option<bool>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "validation": result,
                "found_in_source": found,
            }))?),
            OutputFormat::Quiet => Ok(if result.valid { "valid" } else { "invalid" }.to_string()),
            OutputFormat::Table => {
                let mut lines = Vec::new();
                if result.issues.is_empty() {
                    lines.push(self.info(&format!("{} ellipsis marker(s), no issues", result.ellipsis_count)));
                } else {
                    let mut builder = Builder::default();
                    builder.push_record(["Type", "Severity", "Position", "Message"]);
                    for issue in &result.issues {
                        builder.push_record([
                            label(&issue.issue_type),
                            label(&issue.severity),
                            issue.position.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
                            issue.message.clone(),
                        ]);
                    }
                    let mut table = builder.build();
                    table
                        .with(Style::rounded())
                        .with(Modify::new(Rows::first()).with(Alignment::center()));
                    lines.push(table.to_string());
                }
                if let Some(ratio) = result.omission_ratio {
                    lines.push(format!("Omission ratio: {:.2}", ratio));
                }
                match found {
                    Some(true) => lines.push(self.success("Quote located in source")),
                    Some(false) => lines.push(self.warning("Quote not found in source")),
                    None => {}
                }
                lines.push(if result.valid {
                    self.success("Quotation is valid")
                } else {
                    self.error("Quotation is invalid")
                });
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Wire name of a unit enum variant (`FOUND_SECONDARY`, `ERROR`, ...)
fn label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citegate_extractor::deduplicate;
    use citegate_gatekeeper::validate_ellipsis;
    use citegate_gatekeeper::ValidationConfig;
    use citegate_pipeline::LookupOutcome;

    fn failed_output() -> PipelineOutput {
        PipelineOutput::fail_closed(
            "run-1".to_string(),
            Some("standard".to_string()),
            Some("draft".to_string()),
            "service unavailable",
            0,
        )
    }

    #[test]
    fn test_fail_closed_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_output(&failed_output()).unwrap();
        assert!(output.contains("✗ Run failed closed: service unavailable"));
        assert!(output.contains("Verification rate: ERROR"));
        assert!(output.contains("Holding mismatches: not checked"));
        assert!(output.ends_with("✗ FAIL: verification could not complete"));
    }

    #[test]
    fn test_fail_closed_json_sentinels() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_output(&failed_output()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["passes_hard_gate"], false);
        assert_eq!(value["verification_rate"], "ERROR");
        assert_eq!(value["summary"]["holding_mismatches"], -1);
    }

    #[test]
    fn test_quiet_gate_line() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_output(&failed_output()).unwrap();
        assert!(output.starts_with("✗ FAIL"));
    }

    #[test]
    fn test_normalization_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let strings: Vec<String> = ["100 F.3d 200", "100 F.3d 200", "210 So. 3"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let output = formatter.format_normalization(&deduplicate(&strings)).unwrap();
        assert!(output.contains("kept"));
        assert!(output.contains("incomplete"));
        assert!(output.contains("3 in, 1 unique"));
    }

    #[test]
    fn test_ellipsis_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let config = ValidationConfig::default();
        let result = validate_ellipsis("the court held . . that", None, &config);
        assert_eq!(formatter.format_ellipsis(&result, None).unwrap(), "invalid");
    }

    #[test]
    fn test_label_uses_wire_name() {
        assert_eq!(label(&LookupOutcome::FoundSecondary), "FOUND_SECONDARY");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.warning("test"), "⚠ test");
    }
}
