//! Shorthand resolution: `Id.`, `Ibid.`, `supra` and short-form citations
//!
//! Every resolver reads the full position-ordered citation list and returns
//! a [`ShorthandResolution`]; none of them mutates a sibling citation, so
//! each citation can be resolved independently.

use crate::config::ValidationConfig;
use citegate_domain::{
    CitationRecord, CitationType, ResolutionConfidence, ShorthandResolution,
};
use citegate_extractor::{parse_short_form, reporter_key, strip_signals};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// `Smith, supra` / `Smith supra, at 4`
static SUPRA_HINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*(?P<name>[^,]+?),?\s+supra\b").unwrap());

/// Resolved/unresolved tally for one shorthand type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    /// Resolutions with an antecedent
    pub resolved: usize,
    /// Resolutions without one
    pub unresolved: usize,
}

impl TypeCounts {
    fn record(&mut self, resolution: &ShorthandResolution) {
        if resolution.is_resolved() {
            self.resolved += 1;
        } else {
            self.unresolved += 1;
        }
    }
}

/// Per-type resolution counts for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    /// `Id.`
    pub id: TypeCounts,
    /// `Ibid.`
    pub ibid: TypeCounts,
    /// `supra`
    pub supra: TypeCounts,
    /// `100 F.3d at 205`
    pub short_case: TypeCounts,
}

impl ResolutionStats {
    /// Total resolved across types
    pub fn total_resolved(&self) -> usize {
        self.id.resolved + self.ibid.resolved + self.supra.resolved + self.short_case.resolved
    }

    /// Total unresolved across types
    pub fn total_unresolved(&self) -> usize {
        self.id.unresolved + self.ibid.unresolved + self.supra.unresolved + self.short_case.unresolved
    }
}

/// Output of [`resolve_all`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolutionReport {
    /// One resolution per shorthand citation, in document order
    pub resolutions: Vec<ShorthandResolution>,
    /// Counts by type
    pub stats: ResolutionStats,
}

/// Map a character gap to a confidence band
pub fn confidence_for_gap(gap: usize, config: &ValidationConfig) -> ResolutionConfidence {
    if gap < config.high_confidence_gap {
        ResolutionConfidence::High
    } else if gap < config.medium_confidence_gap {
        ResolutionConfidence::Medium
    } else {
        ResolutionConfidence::Low
    }
}

/// FULL_CASE citations starting strictly before `citation`, nearest first
fn preceding_full_cases<'a>(
    citation: &CitationRecord,
    citations: &'a [CitationRecord],
) -> Vec<&'a CitationRecord> {
    let mut preceding: Vec<&CitationRecord> = citations
        .iter()
        .filter(|c| c.citation_type == CitationType::FullCase && c.start < citation.start)
        .collect();
    preceding.sort_by(|a, b| b.start.cmp(&a.start));
    preceding
}

fn gap_between(shorthand: &CitationRecord, antecedent: &CitationRecord) -> usize {
    shorthand.start.saturating_sub(antecedent.end)
}

fn resolved(
    citation: &CitationRecord,
    antecedent: &CitationRecord,
    confidence: ResolutionConfidence,
    note: Option<String>,
) -> ShorthandResolution {
    ShorthandResolution {
        citation_id: citation.id,
        citation_type: citation.citation_type,
        antecedent_id: Some(antecedent.id),
        confidence,
        note,
    }
}

fn unresolved(citation: &CitationRecord, note: impl Into<String>) -> ShorthandResolution {
    ShorthandResolution {
        citation_id: citation.id,
        citation_type: citation.citation_type,
        antecedent_id: None,
        confidence: ResolutionConfidence::None,
        note: Some(note.into()),
    }
}

fn resolve_nearest(
    citation: &CitationRecord,
    citations: &[CitationRecord],
    config: &ValidationConfig,
) -> ShorthandResolution {
    match preceding_full_cases(citation, citations).first() {
        Some(antecedent) => {
            let confidence = confidence_for_gap(gap_between(citation, antecedent), config);
            resolved(citation, antecedent, confidence, None)
        }
        None => unresolved(
            citation,
            format!("No full case citation precedes '{}'", citation.citation),
        ),
    }
}

/// Resolve `Id.` to the nearest preceding full case citation
///
/// Confidence falls with the character gap: HIGH under
/// `high_confidence_gap`, MEDIUM under `medium_confidence_gap`, LOW beyond.
pub fn resolve_id(
    citation: &CitationRecord,
    citations: &[CitationRecord],
    config: &ValidationConfig,
) -> ShorthandResolution {
    resolve_nearest(citation, citations, config)
}

/// Resolve `Ibid.`; same rule as [`resolve_id`]
pub fn resolve_ibid(
    citation: &CitationRecord,
    citations: &[CitationRecord],
    config: &ValidationConfig,
) -> ShorthandResolution {
    resolve_nearest(citation, citations, config)
}

/// Party-name hint from a leading `Name, supra`, without any signal
pub fn supra_hint(text: &str) -> Option<String> {
    SUPRA_HINT_RE
        .captures(text)
        .and_then(|caps| caps.name("name"))
        .and_then(|m| strip_signals(m.as_str()))
}

/// Resolve `supra` by party name, falling back to the nearest antecedent
///
/// The hint comes from a leading `Name, supra`, or from the record's
/// plaintiff when the caller recovered the name from the draft.
pub fn resolve_supra(
    citation: &CitationRecord,
    citations: &[CitationRecord],
    _config: &ValidationConfig,
) -> ShorthandResolution {
    let hint = supra_hint(&citation.citation).or_else(|| citation.plaintiff.clone());
    let preceding = preceding_full_cases(citation, citations);

    let Some(nearest) = preceding.first() else {
        return unresolved(
            citation,
            format!("No full case citation precedes '{}'", citation.citation),
        );
    };

    match hint {
        Some(hint) => match preceding.iter().find(|c| c.matches_party(&hint)) {
            Some(antecedent) => resolved(citation, antecedent, ResolutionConfidence::High, None),
            None => {
                debug!("Supra hint '{}' matched no antecedent; using nearest", hint);
                resolved(
                    citation,
                    nearest,
                    ResolutionConfidence::Low,
                    Some(format!(
                        "No preceding case matches '{}'; fell back to nearest full citation '{}'",
                        hint, nearest.citation
                    )),
                )
            }
        },
        None => resolved(citation, nearest, ResolutionConfidence::Medium, None),
    }
}

/// Resolve `100 F.3d at 205` to the nearest preceding full citation with the
/// same volume and reporter
pub fn resolve_short_case(
    citation: &CitationRecord,
    citations: &[CitationRecord],
) -> ShorthandResolution {
    let Some(short) = citation
        .parsed
        .clone()
        .or_else(|| parse_short_form(&citation.citation))
    else {
        return unresolved(
            citation,
            format!("Cannot read volume and reporter from '{}'", citation.citation),
        );
    };
    let key = reporter_key(&short.reporter);

    let antecedent = preceding_full_cases(citation, citations)
        .into_iter()
        .find(|c| {
            c.parsed
                .as_ref()
                .map(|p| p.volume == short.volume && reporter_key(&p.reporter) == key)
                .unwrap_or(false)
        });

    match antecedent {
        Some(antecedent) => resolved(citation, antecedent, ResolutionConfidence::High, None),
        None => unresolved(
            citation,
            format!(
                "No preceding full citation to {} {}",
                short.volume, short.reporter
            ),
        ),
    }
}

/// Resolve one citation; `None` for citations that are not shorthand
pub fn resolve(
    citation: &CitationRecord,
    citations: &[CitationRecord],
    config: &ValidationConfig,
) -> Option<ShorthandResolution> {
    match citation.citation_type {
        CitationType::Id => Some(resolve_id(citation, citations, config)),
        CitationType::Ibid => Some(resolve_ibid(citation, citations, config)),
        CitationType::Supra => Some(resolve_supra(citation, citations, config)),
        CitationType::ShortCase => Some(resolve_short_case(citation, citations)),
        _ => None,
    }
}

/// Resolve every shorthand citation in a position-ordered list
pub fn resolve_all(citations: &[CitationRecord], config: &ValidationConfig) -> ResolutionReport {
    let mut report = ResolutionReport::default();

    for citation in citations {
        let Some(resolution) = resolve(citation, citations, config) else {
            continue;
        };
        match citation.citation_type {
            CitationType::Id => report.stats.id.record(&resolution),
            CitationType::Ibid => report.stats.ibid.record(&resolution),
            CitationType::Supra => report.stats.supra.record(&resolution),
            CitationType::ShortCase => report.stats.short_case.record(&resolution),
            _ => {}
        }
        report.resolutions.push(resolution);
    }

    debug!(
        "Resolved {} shorthand citations ({} unresolved)",
        report.stats.total_resolved(),
        report.stats.total_unresolved()
    );
    report
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn rank(c: ResolutionConfidence) -> u8 {
        match c {
            ResolutionConfidence::None => 0,
            ResolutionConfidence::Low => 1,
            ResolutionConfidence::Medium => 2,
            ResolutionConfidence::High => 3,
        }
    }

    proptest! {
        /// Property: confidence never increases with distance
        #[test]
        fn test_confidence_monotone_in_gap(a in 0usize..5000, b in 0usize..5000) {
            let config = ValidationConfig::default();
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(rank(confidence_for_gap(near, &config)) >= rank(confidence_for_gap(far, &config)));
        }
    }
}
