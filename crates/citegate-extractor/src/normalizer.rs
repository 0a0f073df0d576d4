//! Completeness filtering and fragment de-duplication
//!
//! Callers must exclude statutory citations before calling; this module only
//! understands reporter citations.

use crate::reporters::parse_reporter_citation;
use citegate_domain::NormalizedCitation;
use serde::Serialize;
use tracing::debug;

/// Strings shorter than this are never complete (`"1 F. 2"` is the floor)
pub const MIN_CITATION_LENGTH: usize = 6;

/// Collapse runs of whitespace to a single space and trim
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether `raw` is a complete reporter citation
///
/// True iff the string has a leading volume number, a reporter from the
/// federal/regional/state table, and ends in a page or pinpoint (a trailing
/// court/year parenthetical is tolerated).
pub fn is_complete(raw: &str) -> bool {
    let normalized = normalize_whitespace(raw);
    if normalized.chars().count() < MIN_CITATION_LENGTH {
        return false;
    }
    parse_reporter_citation(&normalized).is_some()
}

/// Input/output counts for one de-duplication pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeduplicationStats {
    /// Strings received
    pub input_count: usize,
    /// Strings kept
    pub unique_count: usize,
    /// Strings dropped as truncation or exact duplicates
    pub duplicate_count: usize,
    /// Strings dropped as incomplete
    pub incomplete_count: usize,
}

/// Outcome of [`deduplicate`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeduplicationResult {
    /// Kept citations, in first-appearance order
    pub unique: Vec<String>,
    /// Dropped duplicates, each pointing at the string it duplicates
    pub duplicates_removed: Vec<NormalizedCitation>,
    /// Dropped incomplete strings
    pub incomplete_removed: Vec<NormalizedCitation>,
    /// Counts
    pub stats: DeduplicationStats,
}

enum Verdict {
    Keep,
    Truncation(usize),
    Exact(usize),
}

/// Remove incomplete strings, truncation fragments and case-only duplicates
///
/// 1. Incomplete strings go to `incomplete_removed` (with `duplicate_of` set
///    when they are a prefix of a kept string).
/// 2. Complete strings are visited longest first. A candidate that is a strict
///    prefix of a kept string and fails [`is_complete`] on its own is a
///    truncation duplicate; one that equals a kept string ignoring case is an
///    exact duplicate; anything else is kept.
///
/// A pinpoint variant (`"100 F.3d 200, 205"` next to `"100 F.3d 200"`) is
/// complete on its own and is kept.
pub fn deduplicate(raw_strings: &[String]) -> DeduplicationResult {
    let mut complete: Vec<(usize, String)> = Vec::new();
    let mut incomplete: Vec<String> = Vec::new();

    for (idx, raw) in raw_strings.iter().enumerate() {
        let normalized = normalize_whitespace(raw);
        if is_complete(&normalized) {
            complete.push((idx, normalized));
        } else {
            incomplete.push(normalized);
        }
    }

    // Stable: equal lengths keep input order
    complete.sort_by(|a, b| b.1.chars().count().cmp(&a.1.chars().count()));

    let mut kept: Vec<(usize, String)> = Vec::new();
    let mut duplicates_removed = Vec::new();

    for (idx, candidate) in complete {
        match classify_against(&candidate, &kept) {
            Verdict::Keep => kept.push((idx, candidate)),
            Verdict::Truncation(k) | Verdict::Exact(k) => {
                let original = kept[k].1.clone();
                debug!("Dropping duplicate fragment '{}' of '{}'", candidate, original);
                duplicates_removed.push(NormalizedCitation {
                    parsed: parse_reporter_citation(&candidate),
                    raw: candidate,
                    is_complete: true,
                    is_duplicate: true,
                    duplicate_of: Some(original),
                });
            }
        }
    }

    kept.sort_by_key(|(idx, _)| *idx);
    let unique: Vec<String> = kept.into_iter().map(|(_, s)| s).collect();

    let incomplete_removed: Vec<NormalizedCitation> = incomplete
        .into_iter()
        .map(|raw| {
            let duplicate_of = unique
                .iter()
                .find(|kept| kept.len() > raw.len() && kept.starts_with(raw.as_str()))
                .cloned();
            NormalizedCitation {
                raw,
                parsed: None,
                is_complete: false,
                is_duplicate: false,
                duplicate_of,
            }
        })
        .collect();

    let stats = DeduplicationStats {
        input_count: raw_strings.len(),
        unique_count: unique.len(),
        duplicate_count: duplicates_removed.len(),
        incomplete_count: incomplete_removed.len(),
    };

    debug!(
        "Deduplicated {} fragments: {} unique, {} duplicates, {} incomplete",
        stats.input_count, stats.unique_count, stats.duplicate_count, stats.incomplete_count
    );

    DeduplicationResult {
        unique,
        duplicates_removed,
        incomplete_removed,
        stats,
    }
}

fn classify_against(candidate: &str, kept: &[(usize, String)]) -> Verdict {
    let lowered = candidate.to_lowercase();
    for (k, (_, existing)) in kept.iter().enumerate() {
        if existing.len() > candidate.len()
            && existing.starts_with(candidate)
            && !is_complete(candidate)
        {
            return Verdict::Truncation(k);
        }
        if existing.to_lowercase() == lowered {
            return Verdict::Exact(k);
        }
    }
    Verdict::Keep
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn citation_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            (1u32..999, 1u32..2000).prop_map(|(v, p)| format!("{} F.3d {}", v, p)),
            (1u32..999, 1u32..2000).prop_map(|(v, p)| format!("{} So. 3d {}", v, p)),
            (1u32..999, 1u32..2000, 1u32..50)
                .prop_map(|(v, p, pin)| format!("{} F.3d {}, {}", v, p, p + pin)),
            (1u32..999).prop_map(|v| format!("{} So. 3", v)),
            Just("So. 3d".to_string()),
            (1u32..999, 1u32..2000).prop_map(|(v, p)| format!("{} so. 3d {}", v, p)),
        ]
    }

    proptest! {
        /// Property: re-running on the unique output changes nothing
        #[test]
        fn test_deduplicate_idempotent(input in prop::collection::vec(citation_strategy(), 0..20)) {
            let first = deduplicate(&input);
            let second = deduplicate(&first.unique);
            prop_assert_eq!(&second.unique, &first.unique);
            prop_assert!(second.duplicates_removed.is_empty());
            prop_assert!(second.incomplete_removed.is_empty());
        }

        /// Property: every input string lands in exactly one bucket
        #[test]
        fn test_deduplicate_accounts_for_every_input(input in prop::collection::vec(citation_strategy(), 0..20)) {
            let result = deduplicate(&input);
            prop_assert_eq!(
                result.stats.unique_count + result.stats.duplicate_count + result.stats.incomplete_count,
                input.len()
            );
        }
    }
}
