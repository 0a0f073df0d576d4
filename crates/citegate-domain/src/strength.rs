//! Strength module - how heavily later opinions rely on an authority

use serde::{Deserialize, Serialize};

/// Qualitative strength assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrengthRating {
    /// Widely and recently followed
    Strong,
    /// Regularly followed
    Moderate,
    /// Rarely followed or frequently distinguished
    Weak,
    /// Too few citing opinions to assess
    InsufficientData,
}

impl StrengthRating {
    /// Get the rating name
    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthRating::Strong => "STRONG",
            StrengthRating::Moderate => "MODERATE",
            StrengthRating::Weak => "WEAK",
            StrengthRating::InsufficientData => "INSUFFICIENT_DATA",
        }
    }
}

/// Citing-opinion volume for one authority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthScore {
    /// Assessment
    pub rating: StrengthRating,

    /// Opinions citing this authority
    pub citing_opinion_count: u32,

    /// Of those, opinions filed in the last ten years
    pub citing_opinions_last_10_years: u32,
}
