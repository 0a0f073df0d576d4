//! Adverse-authority detection and remediation guidance
//!
//! Classification is phrase-based over the lower-cased snippet. The
//! false-positive list is consulted first and wins outright: a snippet that
//! reads adversely but describes a favorable outcome is never adverse.

use crate::config::ValidationConfig;
use citegate_domain::{AdverseAuthority, AdverseCandidate};
use serde::Serialize;
use tracing::debug;

/// Outcomes that read adversely but favor the drafting party
const FALSE_POSITIVE_PHRASES: &[&str] = &[
    "we reverse the summary judgment in favor of defendant",
    "reverse the summary judgment in favor of",
    "reversed the summary judgment in favor of",
    "reverse the denial of",
    "reversed the denial of",
    "reversed the order denying",
    "not unenforceable",
    "not overbroad",
    "not an unreasonable restraint",
];

/// Phrases indicating an outcome against the drafting party
const ADVERSE_INDICATORS: &[&str] = &[
    "null and void",
    "reversed",
    "non-compete unenforceable",
    "noncompete unenforceable",
    "covenant unenforceable",
    "unenforceable",
    "overbroad",
    "unreasonable restraint",
    "restraint of trade",
    "summary judgment denied",
    "denied summary judgment",
    "void as against public policy",
    "injunction denied",
    "vacated",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndicatorCategory {
    Unenforceable,
    Overbreadth,
    SummaryJudgmentDenied,
    Other,
}

fn category(indicator: &str) -> IndicatorCategory {
    if indicator.contains("unenforceable") || indicator.contains("void") {
        IndicatorCategory::Unenforceable
    } else if indicator.contains("overbroad") || indicator.contains("restraint") {
        IndicatorCategory::Overbreadth
    } else if indicator.contains("summary judgment") {
        IndicatorCategory::SummaryJudgmentDenied
    } else {
        IndicatorCategory::Other
    }
}

/// Candidates split by outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdverseAnalysis {
    /// Candidates whose outcome cuts against the drafting party
    pub adverse: Vec<AdverseAuthority>,
    /// Everything else
    pub favorable: Vec<AdverseCandidate>,
}

/// Whether one adverse authority is discussed in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressedCheck {
    /// Adverse citation
    pub citation: String,
    /// Short case name searched for
    pub short_case_name: String,
    /// Whether the document mentions it
    pub addressed: bool,
}

/// Split research candidates into adverse and favorable buckets
pub fn detect_adverse_authorities(
    candidates: &[AdverseCandidate],
    config: &ValidationConfig,
) -> AdverseAnalysis {
    let mut analysis = AdverseAnalysis::default();

    for candidate in candidates {
        let snippet = candidate.snippet.to_lowercase();

        if let Some(phrase) = FALSE_POSITIVE_PHRASES.iter().find(|p| snippet.contains(*p)) {
            debug!("'{}' is favorable despite adverse wording ('{}')", candidate.citation, phrase);
            analysis.favorable.push(candidate.clone());
            continue;
        }

        let indicators: Vec<String> = ADVERSE_INDICATORS
            .iter()
            .filter(|i| snippet.contains(*i))
            .map(|i| i.to_string())
            .collect();

        if indicators.is_empty() {
            analysis.favorable.push(candidate.clone());
            continue;
        }

        let holding = extract_holding(&candidate.snippet, &indicators, config.holding_excerpt_chars);
        let mut authority = AdverseAuthority {
            candidate: candidate.clone(),
            adverse_indicators: indicators,
            holding,
            recommended_treatment: String::new(),
        };
        authority.recommended_treatment = recommend_treatment(&authority);
        analysis.adverse.push(authority);
    }

    debug!(
        "Adverse analysis: {} adverse, {} favorable",
        analysis.adverse.len(),
        analysis.favorable.len()
    );
    analysis
}

fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_break = chars.peek().map(|(_, next)| next.is_whitespace()).unwrap_or(true);
            if at_break {
                let end = idx + c.len_utf8();
                out.push(text[start..end].trim());
                start = end;
            }
        }
    }
    if start < text.len() {
        out.push(text[start..].trim());
    }
    out.into_iter().filter(|s| !s.is_empty()).collect()
}

/// First sentence containing a matched indicator, else the opening excerpt
fn extract_holding(snippet: &str, indicators: &[String], excerpt_chars: usize) -> String {
    sentences(snippet)
        .into_iter()
        .find(|sentence| {
            let lowered = sentence.to_lowercase();
            indicators.iter().any(|i| lowered.contains(i.as_str()))
        })
        .map(str::to_string)
        .unwrap_or_else(|| snippet.chars().take(excerpt_chars).collect())
}

fn recommend_treatment(authority: &AdverseAuthority) -> String {
    let name = authority.short_case_name();
    let categories: Vec<IndicatorCategory> =
        authority.adverse_indicators.iter().map(|i| category(i)).collect();

    if categories.contains(&IndicatorCategory::Unenforceable) {
        format!(
            "Distinguish {} on its facts: identify how the restriction, consideration or \
             business interest here differs from the one held unenforceable.",
            name
        )
    } else if categories.contains(&IndicatorCategory::Overbreadth) {
        format!(
            "Address {} with a narrow-tailoring argument: show the restriction here is \
             limited in scope, geography and duration to a protectable interest.",
            name
        )
    } else if categories.contains(&IndicatorCategory::SummaryJudgmentDenied) {
        format!(
            "Distinguish {} as a fact-dispute ruling: summary judgment was denied on a \
             disputed record, which does not decide the legal question presented here.",
            name
        )
    } else {
        format!(
            "Acknowledge {} and explain why its holding does not control the facts of this case.",
            name
        )
    }
}

/// Check which adverse authorities the document mentions by short case name
pub fn check_adverse_authorities_addressed(
    document: &str,
    adverse: &[AdverseAuthority],
) -> Vec<AddressedCheck> {
    let haystack = document.to_lowercase();
    adverse
        .iter()
        .map(|authority| {
            let short_case_name = authority.short_case_name().to_string();
            let needle = short_case_name.to_lowercase();
            AddressedCheck {
                citation: authority.candidate.citation.clone(),
                addressed: !needle.is_empty() && haystack.contains(&needle),
                short_case_name,
            }
        })
        .collect()
}
