//! Flag module - typed findings attached to citations
//!
//! Flag types form a closed set with a fixed priority table. Names that are
//! not part of the table still parse (into [`FlagType::Other`]) and rank at
//! priority 0, so a newer producer never breaks an older consumer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority of `BAD_LAW`; the only critical flag
pub const BAD_LAW_PRIORITY: u32 = 100;

/// Type of finding on a citation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FlagType {
    /// Overruled or otherwise invalidated; blocks delivery
    BadLaw,
    /// Asserted proposition does not match the holding
    HoldingMismatch,
    /// Quoted passage not found in the opinion
    QuoteNotFound,
    /// Unpublished / non-precedential opinion
    Unpublished,
    /// No later opinion has cited this authority
    PotentiallyAbandoned,
    /// Too few citing opinions to assess strength
    WeakAuthority,
    /// A flag name outside the known table
    Other(String),
}

/// Severity band derived from priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagSeverity {
    /// Surfaces for information only
    Note,
    /// Surfaces for human review, never blocks
    Warning,
    /// Blocks delivery
    Critical,
}

impl FlagType {
    /// Every known flag type, highest priority first
    pub const KNOWN: [FlagType; 6] = [
        FlagType::BadLaw,
        FlagType::HoldingMismatch,
        FlagType::QuoteNotFound,
        FlagType::Unpublished,
        FlagType::PotentiallyAbandoned,
        FlagType::WeakAuthority,
    ];

    /// Get the flag name
    pub fn as_str(&self) -> &str {
        match self {
            FlagType::BadLaw => "BAD_LAW",
            FlagType::HoldingMismatch => "HOLDING_MISMATCH",
            FlagType::QuoteNotFound => "QUOTE_NOT_FOUND",
            FlagType::Unpublished => "UNPUBLISHED",
            FlagType::PotentiallyAbandoned => "POTENTIALLY_ABANDONED",
            FlagType::WeakAuthority => "WEAK_AUTHORITY",
            FlagType::Other(name) => name,
        }
    }

    /// Parse a flag name; unknown names become `Other`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "BAD_LAW" => FlagType::BadLaw,
            "HOLDING_MISMATCH" => FlagType::HoldingMismatch,
            "QUOTE_NOT_FOUND" => FlagType::QuoteNotFound,
            "UNPUBLISHED" => FlagType::Unpublished,
            "POTENTIALLY_ABANDONED" => FlagType::PotentiallyAbandoned,
            "WEAK_AUTHORITY" => FlagType::WeakAuthority,
            _ => FlagType::Other(s.trim().to_string()),
        }
    }

    /// Fixed priority (higher = more severe); `Other` is 0
    pub fn priority(&self) -> u32 {
        match self {
            FlagType::BadLaw => BAD_LAW_PRIORITY,
            FlagType::HoldingMismatch => 80,
            FlagType::QuoteNotFound => 70,
            FlagType::Unpublished => 60,
            FlagType::PotentiallyAbandoned => 50,
            FlagType::WeakAuthority => 30,
            FlagType::Other(_) => 0,
        }
    }

    /// Severity band for this type
    pub fn severity(&self) -> FlagSeverity {
        match self.priority() {
            p if p >= BAD_LAW_PRIORITY => FlagSeverity::Critical,
            p if p >= 60 => FlagSeverity::Warning,
            _ => FlagSeverity::Note,
        }
    }

    /// Whether this type belongs to the fixed table
    pub fn is_known(&self) -> bool {
        !matches!(self, FlagType::Other(_))
    }
}

impl From<String> for FlagType {
    fn from(s: String) -> Self {
        FlagType::parse(&s)
    }
}

impl From<FlagType> for String {
    fn from(t: FlagType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finding on one citation
///
/// Priority and severity are derived from the type at construction and
/// cannot be set by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationFlag {
    /// Finding type
    #[serde(rename = "type")]
    pub flag_type: FlagType,

    priority: u32,

    severity: FlagSeverity,

    /// Human-readable description
    pub message: String,

    /// Citation the flag is attached to
    pub citation: String,

    /// What the drafter should do about it
    pub recommendation: String,
}

impl CitationFlag {
    /// Create a flag; priority and severity come from `flag_type`
    pub fn new(
        flag_type: FlagType,
        citation: impl Into<String>,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            priority: flag_type.priority(),
            severity: flag_type.severity(),
            flag_type,
            message: message.into(),
            citation: citation.into(),
            recommendation: recommendation.into(),
        }
    }

    /// Derived priority
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Derived severity
    pub fn severity(&self) -> FlagSeverity {
        self.severity
    }

    /// Whether this flag blocks delivery
    pub fn is_critical(&self) -> bool {
        self.severity == FlagSeverity::Critical
    }
}
