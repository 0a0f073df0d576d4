//! Integration tests for citegate-gatekeeper
//!
//! These tests run extractor output through resolution and flag compilation
//! the way the pipeline does.

use citegate_domain::{CitationRecord, CitationType, FlagType, ResolutionConfidence, StrengthRating};
use citegate_extractor::{classify, fragments_from_strings, parse_reporter_citation};
use citegate_gatekeeper::{
    compile_flags_for_citation, resolve_all, to_strength_score, Gatekeeper, ValidationConfig,
};

fn records_from_draft(draft: &str, citations: &[&str]) -> Vec<CitationRecord> {
    let strings: Vec<String> = citations.iter().map(|s| s.to_string()).collect();
    fragments_from_strings(draft, &strings)
        .into_iter()
        .map(|fragment| {
            let kind = classify(&fragment.text);
            let mut record = CitationRecord::new(fragment.text, kind, fragment.start, fragment.end);
            record.parsed = parse_reporter_citation(&record.citation);
            record
        })
        .collect()
}

#[test]
fn test_resolution_over_a_draft() {
    let gatekeeper = Gatekeeper::new(ValidationConfig::default()).unwrap();
    let draft = "Courts enforce reasonable covenants. 100 F.3d 200. Id. at 204. \
                 The rule is settled. 100 F.3d at 206.";
    let records = records_from_draft(draft, &["100 F.3d 200", "Id. at 204", "100 F.3d at 206"]);

    assert_eq!(records[0].citation_type, CitationType::FullCase);
    assert_eq!(records[1].citation_type, CitationType::Id);
    assert_eq!(records[2].citation_type, CitationType::ShortCase);

    let report = resolve_all(&records, gatekeeper.config());
    assert_eq!(report.resolutions.len(), 2);
    for resolution in &report.resolutions {
        assert_eq!(resolution.antecedent_id, Some(records[0].id));
        assert_eq!(resolution.confidence, ResolutionConfidence::High);
    }
    assert_eq!(report.stats.total_unresolved(), 0);
}

#[test]
fn test_strength_feeds_flags() {
    let gatekeeper = Gatekeeper::new(ValidationConfig::default()).unwrap();
    let mut record = CitationRecord::new("512 F. App'x 45", CitationType::FullCase, 0, 15);
    record.facts.is_unpublished = true;

    let score = to_strength_score(2, 1, StrengthRating::Strong, gatekeeper.config());
    assert_eq!(score.rating, StrengthRating::InsufficientData);

    let flags = compile_flags_for_citation(&record, Some(&score), gatekeeper.config());
    let types: Vec<FlagType> = flags.into_iter().map(|f| f.flag_type).collect();
    assert_eq!(types, vec![FlagType::Unpublished, FlagType::WeakAuthority]);
}
