//! Flag compilation: verification facts to ranked flags

use crate::config::ValidationConfig;
use citegate_domain::{CitationFlag, CitationRecord, FlagType, StrengthRating, StrengthScore};
use tracing::warn;

/// Compile the flags for one citation, highest priority first
///
/// One flag is emitted per true fact. With a strength score, an authority
/// nobody has cited is `POTENTIALLY_ABANDONED`; otherwise one below the
/// weak-authority threshold with `INSUFFICIENT_DATA` is `WEAK_AUTHORITY`.
pub fn compile_flags_for_citation(
    citation: &CitationRecord,
    strength: Option<&StrengthScore>,
    config: &ValidationConfig,
) -> Vec<CitationFlag> {
    let cite = citation.citation.as_str();
    let facts = citation.facts;
    let mut flags = Vec::new();

    if facts.is_bad_law {
        flags.push(CitationFlag::new(
            FlagType::BadLaw,
            cite,
            format!("{} has been overruled, reversed or otherwise invalidated", cite),
            "Remove this citation or replace it with good law before delivery",
        ));
    }
    if facts.holding_mismatch {
        flags.push(CitationFlag::new(
            FlagType::HoldingMismatch,
            cite,
            format!("The proposition attributed to {} does not match its holding", cite),
            "Revise the proposition to reflect what the court actually held",
        ));
    }
    if facts.quote_not_found {
        flags.push(CitationFlag::new(
            FlagType::QuoteNotFound,
            cite,
            format!("The quoted language was not found in {}", cite),
            "Verify the quotation against the opinion text or paraphrase it",
        ));
    }
    if facts.is_unpublished {
        flags.push(CitationFlag::new(
            FlagType::Unpublished,
            cite,
            format!("{} is an unpublished opinion", cite),
            "Confirm local rules permit citing unpublished opinions and add the required notation",
        ));
    }

    if let Some(score) = strength {
        if score.citing_opinion_count == 0 {
            flags.push(CitationFlag::new(
                FlagType::PotentiallyAbandoned,
                cite,
                format!("No later opinion has cited {}", cite),
                "Check whether the authority is still followed; consider a more widely cited case",
            ));
        } else if score.citing_opinion_count < config.weak_authority_threshold
            && score.rating == StrengthRating::InsufficientData
        {
            flags.push(CitationFlag::new(
                FlagType::WeakAuthority,
                cite,
                format!(
                    "{} has been cited by only {} later opinion(s)",
                    cite, score.citing_opinion_count
                ),
                "Support the proposition with an additional, more frequently cited authority",
            ));
        }
    }

    flags.sort_by(|a, b| b.priority().cmp(&a.priority()));
    flags
}

/// Priority for a flag name; unknown names get 0 and a warning
pub fn get_flag_priority(name: &str) -> u32 {
    let flag_type = FlagType::parse(name);
    if !flag_type.is_known() {
        warn!("Unknown flag type '{}'; treating as priority 0", name);
    }
    flag_type.priority()
}

#[cfg(test)]
mod tests {
    use super::*;
    use citegate_domain::{CitationType, FlagSeverity};

    fn record() -> CitationRecord {
        CitationRecord::new("100 F.3d 200", CitationType::FullCase, 0, 12)
    }

    fn score(count: u32, rating: StrengthRating) -> StrengthScore {
        StrengthScore {
            rating,
            citing_opinion_count: count,
            citing_opinions_last_10_years: 0,
        }
    }

    #[test]
    fn test_bad_law_before_quote_not_found() {
        let mut citation = record();
        citation.facts.quote_not_found = true;
        citation.facts.is_bad_law = true;

        let flags = compile_flags_for_citation(&citation, None, &ValidationConfig::default());
        let types: Vec<FlagType> = flags.iter().map(|f| f.flag_type.clone()).collect();
        assert_eq!(types, vec![FlagType::BadLaw, FlagType::QuoteNotFound]);
        assert_eq!(flags[0].severity(), FlagSeverity::Critical);
    }

    #[test]
    fn test_one_flag_per_fact_sorted() {
        let mut citation = record();
        citation.facts.is_unpublished = true;
        citation.facts.holding_mismatch = true;
        citation.facts.quote_not_found = true;

        let flags = compile_flags_for_citation(&citation, None, &ValidationConfig::default());
        let priorities: Vec<u32> = flags.iter().map(|f| f.priority()).collect();
        assert_eq!(priorities, vec![80, 70, 60]);
    }

    #[test]
    fn test_no_facts_no_flags() {
        let flags = compile_flags_for_citation(&record(), None, &ValidationConfig::default());
        assert!(flags.is_empty());
    }

    #[test]
    fn test_zero_citing_is_abandoned_not_weak() {
        let s = score(0, StrengthRating::InsufficientData);
        let flags = compile_flags_for_citation(&record(), Some(&s), &ValidationConfig::default());
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].flag_type, FlagType::PotentiallyAbandoned);
    }

    #[test]
    fn test_weak_authority_requires_insufficient_data() {
        let config = ValidationConfig::default();
        let weak = score(3, StrengthRating::InsufficientData);
        let flags = compile_flags_for_citation(&record(), Some(&weak), &config);
        assert_eq!(flags[0].flag_type, FlagType::WeakAuthority);

        let rated = score(3, StrengthRating::Moderate);
        assert!(compile_flags_for_citation(&record(), Some(&rated), &config).is_empty());

        let plenty = score(12, StrengthRating::InsufficientData);
        assert!(compile_flags_for_citation(&record(), Some(&plenty), &config).is_empty());
    }

    #[test]
    fn test_flag_priority_lookup() {
        assert_eq!(get_flag_priority("BAD_LAW"), 100);
        assert_eq!(get_flag_priority("weak_authority"), 30);
        assert_eq!(get_flag_priority("SOMETHING_NEW"), 0);
    }
}
