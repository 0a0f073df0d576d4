//! Citation module - the unit the integrity pipeline verifies

use crate::flag::{CitationFlag, FlagType};
use crate::strength::StrengthScore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a citation record based on UUIDv7
///
/// Identifiers are minted once per verification run; they sort by creation
/// time, which keeps audit rows for one run together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationId(uuid::Uuid);

impl CitationId {
    /// Generate a new UUIDv7-based CitationId
    ///
    /// # Examples
    ///
    /// ```
    /// use citegate_domain::CitationId;
    ///
    /// let a = CitationId::new();
    /// let b = CitationId::new();
    /// assert_ne!(a, b);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Parse a CitationId from its string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid citation id: {}", e))
    }
}

impl Default for CitationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CitationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of citation as classified by the extraction step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CitationType {
    /// `Smith v. Jones, 100 F.3d 200 (9th Cir. 1996)`
    FullCase,
    /// `100 F.3d at 205`
    ShortCase,
    /// `Smith, supra, at 205`
    Supra,
    /// `Id. at 205`
    Id,
    /// `Ibid.`
    Ibid,
    /// Statutory citation; handled by a separate pipeline
    Statute,
    /// Anything the classifier could not place
    Unknown,
}

impl CitationType {
    /// Get the type name as it appears in extraction output
    pub fn as_str(&self) -> &'static str {
        match self {
            CitationType::FullCase => "FULL_CASE",
            CitationType::ShortCase => "SHORT_CASE",
            CitationType::Supra => "SUPRA",
            CitationType::Id => "ID",
            CitationType::Ibid => "IBID",
            CitationType::Statute => "STATUTE",
            CitationType::Unknown => "UNKNOWN",
        }
    }

    /// Parse a type name; unrecognized names map to `Unknown`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "FULL_CASE" => CitationType::FullCase,
            "SHORT_CASE" => CitationType::ShortCase,
            "SUPRA" => CitationType::Supra,
            "ID" => CitationType::Id,
            "IBID" => CitationType::Ibid,
            "STATUTE" => CitationType::Statute,
            _ => CitationType::Unknown,
        }
    }

    /// True for citations that refer back to an earlier full citation
    pub fn is_shorthand(&self) -> bool {
        matches!(
            self,
            CitationType::ShortCase | CitationType::Supra | CitationType::Id | CitationType::Ibid
        )
    }
}

/// Tool that produced a raw citation fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionOrigin {
    /// eyecite extraction script
    Eyecite,
    /// Built-in pattern scan of the draft
    Pattern,
    /// Citations proposed by the drafting model
    Llm,
    /// Supplied by hand
    #[default]
    Manual,
}

/// A raw, machine-extracted citation string with its document position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCitationFragment {
    /// Text exactly as extracted (may be truncated)
    pub text: String,

    /// Start character offset in the draft
    pub start: usize,

    /// End character offset in the draft
    pub end: usize,

    /// Extraction tool that produced the fragment
    #[serde(default)]
    pub origin: ExtractionOrigin,

    /// Type assigned by the extraction tool, if it classified the fragment
    #[serde(default)]
    pub citation_type: Option<CitationType>,

    /// Plaintiff name reported by the extraction tool
    #[serde(default)]
    pub plaintiff: Option<String>,

    /// Defendant name reported by the extraction tool
    #[serde(default)]
    pub defendant: Option<String>,
}

impl RawCitationFragment {
    /// Create a fragment with no tool metadata
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            origin: ExtractionOrigin::Manual,
            citation_type: None,
            plaintiff: None,
            defendant: None,
        }
    }

    /// Set the extraction origin
    pub fn with_origin(mut self, origin: ExtractionOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Set the tool-assigned citation type
    pub fn with_type(mut self, citation_type: CitationType) -> Self {
        self.citation_type = Some(citation_type);
        self
    }

    /// Set both party names
    pub fn with_parties(mut self, plaintiff: impl Into<String>, defendant: impl Into<String>) -> Self {
        self.plaintiff = Some(plaintiff.into());
        self.defendant = Some(defendant.into());
        self
    }
}

/// Volume / reporter / page decomposition of a reporter citation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCitation {
    /// Reporter volume
    pub volume: u32,

    /// Reporter abbreviation as written (`F.3d`, `So. 3d`)
    pub reporter: String,

    /// First page of the opinion
    pub page: u32,

    /// Pinpoint page or range (`205`, `205-07`)
    pub pinpoint: Option<String>,
}

/// A raw string after completeness and duplicate analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedCitation {
    /// The raw string (trimmed)
    pub raw: String,

    /// Parsed components, present when the string is complete
    pub parsed: Option<ParsedCitation>,

    /// Whether the string is a complete reporter citation
    pub is_complete: bool,

    /// Whether the string was discarded as a duplicate
    pub is_duplicate: bool,

    /// Kept string this one duplicates (a back-reference, not ownership)
    pub duplicate_of: Option<String>,
}

/// Boolean verification facts gathered for one citation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationFacts {
    /// Overruled, reversed, or otherwise invalidated
    pub is_bad_law: bool,

    /// The asserted proposition does not match the holding
    pub holding_mismatch: bool,

    /// A quotation attributed to the opinion was not found in it
    pub quote_not_found: bool,

    /// The opinion is unpublished / non-precedential
    pub is_unpublished: bool,
}

/// Audit outcome persisted for a citation once a run completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// Found and carries no flags
    Verified,
    /// Found but carries at least one flag
    Flagged,
    /// Not found, lookup failed, or shorthand could not be resolved
    Failed,
}

/// What the draft asserts about a citation
///
/// Supplied by the drafting step; both parts are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationAssertion {
    /// Citation string the assertion is attached to
    pub citation: String,

    /// Proposition the draft cites the authority for
    #[serde(default)]
    pub proposition: Option<String>,

    /// Quoted passage attributed to the authority
    #[serde(default)]
    pub quoted_text: Option<String>,
}

/// A citation tracked through one verification run
///
/// Records are created from one document's extracted fragments and mutated in
/// place as each stage attaches resolution and verification metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationRecord {
    /// Identity within the run
    pub id: CitationId,

    /// Full citation string
    pub citation: String,

    /// Classified type
    pub citation_type: CitationType,

    /// Start character offset in the draft
    pub start: usize,

    /// End character offset in the draft
    pub end: usize,

    /// Parsed reporter components (full and short-form case citations)
    pub parsed: Option<ParsedCitation>,

    /// `Plaintiff v. Defendant`
    pub case_name: Option<String>,

    /// Plaintiff party name
    pub plaintiff: Option<String>,

    /// Defendant party name
    pub defendant: Option<String>,

    /// Antecedent full citation; set only by shorthand resolution
    pub antecedent_id: Option<CitationId>,

    /// Verification facts
    pub facts: VerificationFacts,

    /// Citing-opinion strength, when research context supplied it
    pub strength_score: Option<StrengthScore>,

    /// Compiled flags, highest priority first
    pub flags: Vec<CitationFlag>,
}

impl CitationRecord {
    /// Create a record with no verification metadata
    pub fn new(citation: impl Into<String>, citation_type: CitationType, start: usize, end: usize) -> Self {
        Self {
            id: CitationId::new(),
            citation: citation.into(),
            citation_type,
            start,
            end,
            parsed: None,
            case_name: None,
            plaintiff: None,
            defendant: None,
            antecedent_id: None,
            facts: VerificationFacts::default(),
            strength_score: None,
            flags: Vec::new(),
        }
    }

    /// Attach party names and derive the case name
    pub fn with_parties(mut self, plaintiff: Option<String>, defendant: Option<String>) -> Self {
        if let (Some(p), Some(d)) = (&plaintiff, &defendant) {
            self.case_name = Some(format!("{} v. {}", p, d));
        }
        self.plaintiff = plaintiff;
        self.defendant = defendant;
        self
    }

    /// Whether the case name, plaintiff, or defendant contains `hint`
    /// (case-insensitive substring)
    pub fn matches_party(&self, hint: &str) -> bool {
        let hint = hint.trim().to_lowercase();
        if hint.is_empty() {
            return false;
        }
        [&self.case_name, &self.plaintiff, &self.defendant]
            .iter()
            .filter_map(|field| field.as_deref())
            .any(|value| value.to_lowercase().contains(&hint))
    }

    /// Short case name: the text before ` v.` in the case name
    pub fn short_case_name(&self) -> Option<&str> {
        self.case_name.as_deref().map(short_case_name)
    }

    /// Whether any attached flag blocks delivery
    pub fn has_critical_flag(&self) -> bool {
        self.flags.iter().any(|f| f.flag_type == FlagType::BadLaw)
    }
}

/// Text before ` v.` in a case name, trimmed; the whole name if absent
pub fn short_case_name(case_name: &str) -> &str {
    match case_name.find(" v.") {
        Some(idx) => case_name[..idx].trim(),
        None => case_name.trim(),
    }
}
