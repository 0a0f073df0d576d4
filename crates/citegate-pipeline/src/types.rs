//! Request and response types for a verification run

use crate::metrics::RunMetrics;
use citegate_domain::{
    AdverseAuthority, AdverseCandidate, AuthorityRecord, BatchError, CitationAssertion,
    CitationRecord, EllipsisValidationResult, HoldingVerdict, NormalizedCitation,
    RawCitationFragment, ShorthandResolution, StrengthRating, VerificationStatus,
};
use citegate_extractor::{normalize_whitespace, DeduplicationStats};
use citegate_gatekeeper::{AddressedCheck, ResolutionStats};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// Research findings for one authority, gathered before drafting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationResearch {
    /// Overruled or otherwise invalidated
    pub bad_law: bool,

    /// Opinions citing this authority; `None` when not researched
    pub citing_opinion_count: Option<u32>,

    /// Of those, opinions filed in the last ten years
    pub citing_opinions_last_10_years: u32,

    /// Rating from the research source
    pub rating: Option<StrengthRating>,
}

/// Everything research produced for one draft
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchContext {
    /// Findings keyed by citation string
    pub citations: HashMap<String, CitationResearch>,

    /// Research results to screen for adverse authority
    pub adverse_candidates: Vec<AdverseCandidate>,
}

impl ResearchContext {
    /// Findings for a citation, ignoring whitespace and case differences
    pub fn for_citation(&self, citation: &str) -> Option<&CitationResearch> {
        if let Some(research) = self.citations.get(citation) {
            return Some(research);
        }
        let wanted = citation_key(citation);
        self.citations
            .iter()
            .find(|(key, _)| citation_key(key) == wanted)
            .map(|(_, research)| research)
    }
}

/// Input to one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationRequest {
    /// Full draft text; offsets in `fragments` are character offsets into it
    pub draft: String,

    /// Extracted citation fragments
    pub fragments: Vec<RawCitationFragment>,

    /// Propositions and quotations the draft attributes to citations
    pub assertions: Vec<CitationAssertion>,

    /// Research gathered before drafting
    pub research: ResearchContext,

    /// Drafting tier, for the audit trail
    pub tier: Option<String>,

    /// Drafting phase, for the audit trail
    pub phase: Option<String>,
}

impl VerificationRequest {
    /// Request for a draft and its fragments
    pub fn new(draft: impl Into<String>, fragments: Vec<RawCitationFragment>) -> Self {
        Self {
            draft: draft.into(),
            fragments,
            ..Self::default()
        }
    }

    /// Attach assertions
    pub fn with_assertions(mut self, assertions: Vec<CitationAssertion>) -> Self {
        self.assertions = assertions;
        self
    }

    /// Attach research findings
    pub fn with_research(mut self, research: ResearchContext) -> Self {
        self.research = research;
        self
    }

    /// Attach audit identifiers
    pub fn with_audit(mut self, tier: impl Into<String>, phase: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self.phase = Some(phase.into());
        self
    }

    /// First assertion attached to `citation`
    pub fn assertion_for(&self, citation: &str) -> Option<&CitationAssertion> {
        let wanted = citation_key(citation);
        self.assertions
            .iter()
            .find(|a| citation_key(&a.citation) == wanted)
    }
}

fn citation_key(citation: &str) -> String {
    normalize_whitespace(citation).to_lowercase()
}

/// How a citation's authority was established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LookupOutcome {
    /// Found by the primary database
    Found,
    /// Found by the secondary source after a primary miss
    FoundSecondary,
    /// Shorthand citation sharing its antecedent's found authority
    Inherited,
    /// Not found anywhere
    NotFound,
    /// The lookup failed or timed out
    Failed,
    /// Shorthand citation with no antecedent
    Unresolved,
}

impl LookupOutcome {
    /// Whether the authority was confirmed to exist
    pub fn is_found(&self) -> bool {
        matches!(
            self,
            LookupOutcome::Found | LookupOutcome::FoundSecondary | LookupOutcome::Inherited
        )
    }
}

/// Everything the run learned about one citation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationResult {
    /// The citation with its facts, strength and flags
    pub record: CitationRecord,

    /// Audit status
    pub status: VerificationStatus,

    /// How the authority was established
    pub lookup: LookupOutcome,

    /// Lookup error, when `lookup` is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_error: Option<String>,

    /// The authority, when found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<AuthorityRecord>,

    /// Antecedent link for shorthand citations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ShorthandResolution>,

    /// Ellipsis check on the quoted passage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ellipsis: Option<EllipsisValidationResult>,

    /// Holding verifier's answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holding_verdict: Option<HoldingVerdict>,
}

/// Percentage of citations whose authority was confirmed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerificationRate {
    /// Measured percentage, 0 to 100
    Percent(f64),
    /// The run aborted before anything could be measured
    Error,
}

impl VerificationRate {
    /// Rate for `verified` of `total`; an empty run verifies everything it has
    pub fn from_counts(verified: usize, total: usize) -> Self {
        if total == 0 {
            return VerificationRate::Percent(100.0);
        }
        let percent = verified as f64 / total as f64 * 100.0;
        VerificationRate::Percent((percent * 10.0).round() / 10.0)
    }

    /// The percentage, if measured
    pub fn percent(&self) -> Option<f64> {
        match self {
            VerificationRate::Percent(p) => Some(*p),
            VerificationRate::Error => None,
        }
    }
}

impl Serialize for VerificationRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            VerificationRate::Percent(p) => serializer.serialize_f64(*p),
            VerificationRate::Error => serializer.serialize_str("ERROR"),
        }
    }
}

/// `None` serializes as -1 ("not measured")
fn serialize_measured<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(count) => serializer.serialize_i64(*count as i64),
        None => serializer.serialize_i64(-1),
    }
}

/// Counts across every citation in a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateSummary {
    /// Citations evaluated (statutes and dropped fragments excluded)
    pub total: usize,

    /// Citations whose authority was confirmed
    pub verified: usize,

    /// Of those, citations carrying at least one flag
    pub flagged: usize,

    /// Citations to remove: not found, failed or unresolved
    pub removed: usize,

    /// Citations carrying a critical flag
    pub critical: usize,

    /// Holding mismatches; -1 when holdings were not checked
    #[serde(serialize_with = "serialize_measured")]
    pub holding_mismatches: Option<usize>,

    /// Quotations not found in their opinion
    pub quotes_not_found: usize,

    /// Quotations with an ellipsis error
    pub ellipsis_errors: usize,
}

/// Result of one run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// Run identifier
    pub run_id: String,

    /// Drafting tier, echoed from the request
    pub tier: Option<String>,

    /// Drafting phase, echoed from the request
    pub phase: Option<String>,

    /// Whether the draft may be delivered
    pub passes_hard_gate: bool,

    /// Why the run failed closed, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Confirmed citations as a percentage
    pub verification_rate: VerificationRate,

    /// Aggregate counts
    pub summary: AggregateSummary,

    /// Per-citation results in document order
    pub results: Vec<CitationResult>,

    /// Fragment de-duplication counts
    pub normalization: DeduplicationStats,

    /// Dropped duplicate fragments
    pub duplicates_removed: Vec<NormalizedCitation>,

    /// Dropped incomplete fragments
    pub incomplete_removed: Vec<NormalizedCitation>,

    /// Shorthand resolution counts
    pub resolution_stats: ResolutionStats,

    /// Research results classified as adverse
    pub adverse_authorities: Vec<AdverseAuthority>,

    /// Adverse authorities the draft does not mention
    pub unaddressed_adverse: Vec<AddressedCheck>,

    /// Whether unaddressed adverse authority requires a revision pass
    pub revision_required: bool,

    /// Lookup sub-batch errors
    pub batch_errors: Vec<BatchError>,

    /// Secondary-source calls charged during this run
    pub run_cost: usize,

    /// Secondary-source calls charged this session
    pub session_cost: usize,

    /// Run counters
    pub metrics: RunMetrics,
}

impl PipelineOutput {
    /// Fail-closed output: gate shut, rate `ERROR`, nothing measured
    pub fn fail_closed(
        run_id: String,
        tier: Option<String>,
        phase: Option<String>,
        error: impl Into<String>,
        session_cost: usize,
    ) -> Self {
        Self {
            run_id,
            tier,
            phase,
            passes_hard_gate: false,
            error: Some(error.into()),
            verification_rate: VerificationRate::Error,
            summary: AggregateSummary::default(),
            results: Vec::new(),
            normalization: DeduplicationStats::default(),
            duplicates_removed: Vec::new(),
            incomplete_removed: Vec::new(),
            resolution_stats: ResolutionStats::default(),
            adverse_authorities: Vec::new(),
            unaddressed_adverse: Vec::new(),
            revision_required: false,
            batch_errors: Vec::new(),
            run_cost: 0,
            session_cost,
            metrics: RunMetrics::default(),
        }
    }

    /// Whether the run failed closed
    pub fn is_fail_closed(&self) -> bool {
        self.error.is_some()
    }

    /// Results carrying a critical flag
    pub fn blocking(&self) -> impl Iterator<Item = &CitationResult> {
        self.results.iter().filter(|r| r.record.has_critical_flag())
    }
}
