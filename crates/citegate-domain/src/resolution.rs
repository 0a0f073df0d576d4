//! Resolution module - linking shorthand citations to their antecedents

use crate::citation::{CitationId, CitationType};
use serde::{Deserialize, Serialize};

/// Confidence that a shorthand citation points at the chosen antecedent
///
/// Ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionConfidence {
    /// No antecedent found
    None,
    /// Fallback or distant antecedent
    Low,
    /// Plausible antecedent
    Medium,
    /// Nearby or name-matched antecedent
    High,
}

/// Outcome of resolving one shorthand citation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShorthandResolution {
    /// Shorthand citation being resolved
    pub citation_id: CitationId,

    /// Its type (ID, IBID, SUPRA, SHORT_CASE)
    pub citation_type: CitationType,

    /// Chosen antecedent, if any
    pub antecedent_id: Option<CitationId>,

    /// Confidence in the choice
    pub confidence: ResolutionConfidence,

    /// Explanation for unresolved or fallback results
    pub note: Option<String>,
}

impl ShorthandResolution {
    /// Whether an antecedent was found
    pub fn is_resolved(&self) -> bool {
        self.antecedent_id.is_some()
    }
}
