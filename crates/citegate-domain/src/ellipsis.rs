//! Ellipsis module - quotation fidelity findings

use serde::{Deserialize, Serialize};

/// Kind of ellipsis finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EllipsisIssueType {
    /// Malformed ellipsis (wrong dot count, leading ellipsis)
    SyntaxError,
    /// The omitted text carried a negation or qualifier
    MeaningChange,
    /// Too much of the source was omitted
    ExcessiveOmission,
    /// Four-dot ellipsis closing a sub-clause rather than a sentence
    ImproperFourDot,
}

/// Severity of an ellipsis finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueSeverity {
    /// Reported for review
    Warning,
    /// Makes the quotation invalid
    Error,
}

/// One ellipsis finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipsisIssue {
    /// Finding kind
    #[serde(rename = "type")]
    pub issue_type: EllipsisIssueType,

    /// Severity
    pub severity: IssueSeverity,

    /// Description, quoting the offending text where useful
    pub message: String,

    /// Character offset in the quote, when the finding has one
    pub position: Option<usize>,
}

/// Outcome of validating one quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipsisValidationResult {
    /// False iff any issue has `Error` severity
    pub valid: bool,

    /// All findings, in detection order
    pub issues: Vec<EllipsisIssue>,

    /// Number of ellipsis markers found
    pub ellipsis_count: usize,

    /// Length of the quote in characters
    pub quoted_text_length: usize,

    /// `1 - len(quote)/len(source)`; present only when source text was given
    pub omission_ratio: Option<f64>,
}

impl EllipsisValidationResult {
    /// Result for a quote with no ellipsis markers
    pub fn clean(quoted_text_length: usize) -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
            ellipsis_count: 0,
            quoted_text_length,
            omission_ratio: None,
        }
    }

    /// Issues of the given type
    pub fn issues_of(&self, issue_type: EllipsisIssueType) -> impl Iterator<Item = &EllipsisIssue> {
        self.issues.iter().filter(move |i| i.issue_type == issue_type)
    }
}
