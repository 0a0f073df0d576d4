//! Authority module - records returned by the external authority database

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the authority database knows about one citation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorityRecord {
    /// Whether the citation matched a real opinion
    pub found: bool,

    /// Opinion identifier in the authority database
    #[serde(default)]
    pub opinion_id: Option<String>,

    /// Case name as recorded
    #[serde(default)]
    pub case_name: Option<String>,

    /// Deciding court
    #[serde(default)]
    pub court: Option<String>,

    /// Filing date (ISO 8601)
    #[serde(default)]
    pub date_filed: Option<String>,

    /// `Published`, `Unpublished`, `Errata`, ...
    #[serde(default)]
    pub precedential_status: Option<String>,

    /// Opinion text, when the source returns it
    #[serde(default)]
    pub opinion_text: Option<String>,
}

impl AuthorityRecord {
    /// A record for a citation the source does not know
    pub fn not_found() -> Self {
        Self::default()
    }

    /// A found record with just an opinion id
    pub fn found(opinion_id: impl Into<String>) -> Self {
        Self {
            found: true,
            opinion_id: Some(opinion_id.into()),
            ..Self::default()
        }
    }

    /// Whether the source reports the opinion as non-precedential
    pub fn is_unpublished(&self) -> bool {
        match self.precedential_status.as_deref() {
            Some(status) => {
                let status = status.to_ascii_lowercase();
                status.contains("unpublished") || status.contains("non-precedential")
            }
            None => false,
        }
    }
}

/// One failed sub-batch of a batch lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchError {
    /// Citations (joined) that the failed sub-batch carried
    pub text_block: String,

    /// Failure description
    pub error: String,

    /// Whether a retry could succeed (timeouts, rate limits)
    pub recoverable: bool,
}

/// Result of a batch lookup
///
/// A citation absent from `results` is treated as not found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchLookup {
    /// Records keyed by the citation string as submitted
    pub results: HashMap<String, AuthorityRecord>,

    /// Sub-batches that failed
    pub errors: Vec<BatchError>,
}

impl BatchLookup {
    /// Record for `citation`, if the source returned one and found it
    pub fn found(&self, citation: &str) -> Option<&AuthorityRecord> {
        self.results.get(citation).filter(|r| r.found)
    }
}

/// Verdict of the holding/proposition verifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldingVerdict {
    /// The opinion states the proposition
    Exact,
    /// The opinion supports the proposition
    Consistent,
    /// The opinion does not support the proposition
    Mismatch,
    /// The verifier could not decide
    Unverifiable,
}

impl HoldingVerdict {
    /// Whether the verdict supports the asserted proposition
    pub fn supports(&self) -> bool {
        matches!(self, HoldingVerdict::Exact | HoldingVerdict::Consistent)
    }

    /// Parse a verdict name; anything unrecognized is `Unverifiable`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "EXACT" => HoldingVerdict::Exact,
            "CONSISTENT" => HoldingVerdict::Consistent,
            "MISMATCH" => HoldingVerdict::Mismatch,
            _ => HoldingVerdict::Unverifiable,
        }
    }
}
