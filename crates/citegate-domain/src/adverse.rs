//! Adverse-authority module

use serde::{Deserialize, Serialize};

/// A research result that may cut against the drafting party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdverseCandidate {
    /// Citation string
    pub citation: String,

    /// `Plaintiff v. Defendant`, when known
    #[serde(default)]
    pub case_name: Option<String>,

    /// Supporting snippet from the opinion
    pub snippet: String,

    /// Research relevance score
    #[serde(default)]
    pub relevance: f64,
}

/// A candidate classified as adverse, with remediation guidance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdverseAuthority {
    /// The scored citation
    pub candidate: AdverseCandidate,

    /// Every adverse phrase matched in the snippet
    pub adverse_indicators: Vec<String>,

    /// Representative holding sentence
    pub holding: String,

    /// Templated remediation instruction
    pub recommended_treatment: String,
}

impl AdverseAuthority {
    /// Short case name (text before ` v.`), falling back to the citation
    pub fn short_case_name(&self) -> &str {
        match &self.candidate.case_name {
            Some(name) => crate::citation::short_case_name(name),
            None => crate::citation::short_case_name(&self.candidate.citation),
        }
    }
}
