//! End-to-end runs against mock collaborators

use citegate_domain::{
    AdverseCandidate, AuthorityRecord, CitationAssertion, CitationType, FlagType, HoldingVerdict,
    RawCitationFragment, ResolutionConfidence, VerificationStatus,
};
use citegate_gatekeeper::{Gatekeeper, ValidationConfig};
use citegate_pipeline::{
    CitationPipeline, CitationResearch, LookupOutcome, PipelineConfig, ResearchContext,
    SessionCost, VerificationRate, VerificationRequest,
};
use citegate_verifier::{
    CachedAuthorityVerifier, MockAuthorityVerifier, MockHoldingVerifier, MockSecondarySource,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn gatekeeper() -> Gatekeeper {
    Gatekeeper::new(ValidationConfig::default()).unwrap()
}

/// Fragment for the `nth` occurrence of `text`, with character offsets
fn fragment(draft: &str, text: &str, nth: usize) -> RawCitationFragment {
    let (byte, _) = draft
        .match_indices(text)
        .nth(nth)
        .unwrap_or_else(|| panic!("'{}' not in draft", text));
    let start = draft[..byte].chars().count();
    RawCitationFragment::new(text, start, start + text.chars().count())
}

fn research(entries: &[(&str, CitationResearch)]) -> ResearchContext {
    ResearchContext {
        citations: entries
            .iter()
            .map(|(c, r)| (c.to_string(), r.clone()))
            .collect(),
        adverse_candidates: Vec::new(),
    }
}

const DRAFT: &str = "See Smith v. Jones, 210 So. 3d 447 (Fla. 2017). Id. at 450. \
Sovereign immunity is waived by Fla. Stat. § 768.28. \
Doe v. Roe, 100 F.3d 200 (9th Cir. 1996). Later, 210 So. 3d at 449.";

fn draft_fragments() -> Vec<RawCitationFragment> {
    vec![
        fragment(DRAFT, "210 So. 3", 0),
        fragment(DRAFT, "210 So. 3d 447", 0),
        fragment(DRAFT, "Id. at 450", 0),
        fragment(DRAFT, "Fla. Stat. § 768.28", 0),
        fragment(DRAFT, "100 F.3d 200", 0),
        fragment(DRAFT, "210 So. 3d at 449", 0),
    ]
}

#[tokio::test]
async fn test_end_to_end_dedup_and_resolution() {
    let authority = MockAuthorityVerifier::new();
    authority.add_found("210 So. 3d 447", "op-1");
    authority.add_found("100 F.3d 200", "op-2");

    let pipeline = CitationPipeline::new(authority.clone(), gatekeeper(), PipelineConfig::default());
    let request = VerificationRequest::new(DRAFT, draft_fragments()).with_audit("tier-2", "draft");
    let output = pipeline.run(&request).await;

    assert!(!output.is_fail_closed());
    assert!(output.passes_hard_gate);
    assert_eq!(output.tier.as_deref(), Some("tier-2"));

    // Truncated fragment dropped, statute excluded, two unique lookups in one batch
    assert_eq!(output.normalization.incomplete_count, 1);
    assert_eq!(output.metrics.statutes_excluded, 1);
    assert_eq!(authority.call_count(), 1);
    assert_eq!(authority.batches()[0].len(), 2);

    let types: Vec<CitationType> = output.results.iter().map(|r| r.record.citation_type).collect();
    assert_eq!(
        types,
        vec![
            CitationType::FullCase,
            CitationType::Id,
            CitationType::FullCase,
            CitationType::ShortCase
        ]
    );

    let antecedent = output.results[0].record.id;
    for shorthand in [&output.results[1], &output.results[3]] {
        let resolution = shorthand.resolution.as_ref().unwrap();
        assert_eq!(resolution.antecedent_id, Some(antecedent));
        assert_eq!(resolution.confidence, ResolutionConfidence::High);
        assert_eq!(shorthand.lookup, LookupOutcome::Inherited);
        assert_eq!(shorthand.status, VerificationStatus::Verified);
    }

    assert_eq!(output.results[0].record.plaintiff.as_deref(), Some("Smith"));
    assert_eq!(output.summary.total, 4);
    assert_eq!(output.summary.verified, 4);
    assert_eq!(output.summary.removed, 0);
    assert_eq!(output.verification_rate, VerificationRate::Percent(100.0));
    assert_eq!(output.summary.holding_mismatches, None);
}

#[tokio::test]
async fn test_bad_law_closes_gate() {
    let draft = "Doe v. Roe, 100 F.3d 200 (9th Cir. 1996).";
    let authority = MockAuthorityVerifier::new();
    authority.add_found("100 F.3d 200", "op-2");

    let pipeline = CitationPipeline::new(authority, gatekeeper(), PipelineConfig::default());
    let request = VerificationRequest::new(draft, vec![fragment(draft, "100 F.3d 200", 0)])
        .with_research(research(&[(
            "100 F.3d 200",
            CitationResearch {
                bad_law: true,
                ..CitationResearch::default()
            },
        )]));
    let output = pipeline.run(&request).await;

    assert!(!output.passes_hard_gate);
    assert!(!output.is_fail_closed());
    assert_eq!(output.summary.critical, 1);
    assert_eq!(output.blocking().count(), 1);

    let result = &output.results[0];
    assert_eq!(result.status, VerificationStatus::Flagged);
    assert_eq!(result.record.flags[0].flag_type, FlagType::BadLaw);
}

#[tokio::test]
async fn test_bad_law_among_clean_citations_closes_gate() {
    let draft = "A v. B, 1 F.3d 2 (1990). C v. D, 3 F.3d 4 (1991). \
E v. F, 5 F.3d 6 (1992). Doe v. Roe, 100 F.3d 200 (9th Cir. 1996).";
    let citations = ["1 F.3d 2", "3 F.3d 4", "5 F.3d 6", "100 F.3d 200"];
    let authority = MockAuthorityVerifier::new();
    for (i, c) in citations.iter().enumerate() {
        authority.add_found(*c, format!("op-{}", i));
    }

    let pipeline = CitationPipeline::new(authority, gatekeeper(), PipelineConfig::default());
    let fragments = citations.iter().map(|c| fragment(draft, c, 0)).collect();
    let request = VerificationRequest::new(draft, fragments).with_research(research(&[(
        "100 F.3d 200",
        CitationResearch {
            bad_law: true,
            ..CitationResearch::default()
        },
    )]));
    let output = pipeline.run(&request).await;

    assert!(!output.is_fail_closed());
    assert!(!output.passes_hard_gate);
    assert_eq!(output.summary.total, 4);
    assert_eq!(output.summary.critical, 1);
    assert_eq!(output.summary.verified, 3);

    let blocking: Vec<_> = output.blocking().collect();
    assert_eq!(blocking.len(), 1);
    assert_eq!(blocking[0].record.citation, "100 F.3d 200");
}

#[tokio::test]
async fn test_id_follows_nearest_repeat_of_citation() {
    let draft = "Smith v. Jones, 1 F.3d 2 (1990). Doe v. Roe, 3 F.3d 4 (1991). \
As held in Smith v. Jones, 1 F.3d 2, the rule applies. Id. at 5.";
    let authority = MockAuthorityVerifier::new();
    authority.add_found("1 F.3d 2", "op-1");
    authority.add_found("3 F.3d 4", "op-2");

    let pipeline = CitationPipeline::new(authority.clone(), gatekeeper(), PipelineConfig::default());
    let fragments = vec![
        fragment(draft, "1 F.3d 2", 0),
        fragment(draft, "3 F.3d 4", 0),
        fragment(draft, "1 F.3d 2", 1),
        fragment(draft, "Id. at 5", 0),
    ];
    let output = pipeline.run(&VerificationRequest::new(draft, fragments)).await;

    assert!(output.passes_hard_gate);
    // The repeat is looked up once but reported at both places
    assert_eq!(authority.batches()[0].len(), 2);
    assert_eq!(output.summary.total, 4);

    let repeat = &output.results[2];
    assert_eq!(repeat.record.citation, "1 F.3d 2");
    assert_eq!(repeat.record.plaintiff.as_deref(), Some("Smith"));

    let id = &output.results[3];
    assert_eq!(id.record.citation_type, CitationType::Id);
    let resolution = id.resolution.as_ref().unwrap();
    assert_eq!(resolution.antecedent_id, Some(repeat.record.id));
    assert_eq!(resolution.confidence, ResolutionConfidence::High);
    assert_eq!(id.status, VerificationStatus::Verified);
}

#[tokio::test]
async fn test_advisory_flags_do_not_block() {
    let draft = "A v. B, 1 F.3d 2. C v. D, 3 F.3d 4. E v. F, 2020 WL 1234567.";
    let authority = MockAuthorityVerifier::new();
    for (i, c) in ["1 F.3d 2", "3 F.3d 4", "2020 WL 1234567"].iter().enumerate() {
        authority.add_found(*c, format!("op-{}", i));
    }

    let pipeline = CitationPipeline::new(authority, gatekeeper(), PipelineConfig::default());
    let request = VerificationRequest::new(
        draft,
        vec![
            fragment(draft, "1 F.3d 2", 0),
            fragment(draft, "3 F.3d 4", 0),
            fragment(draft, "2020 WL 1234567", 0),
        ],
    )
    .with_research(research(&[
        (
            "1 F.3d 2",
            CitationResearch {
                citing_opinion_count: Some(0),
                ..CitationResearch::default()
            },
        ),
        (
            "3 F.3d 4",
            CitationResearch {
                citing_opinion_count: Some(2),
                ..CitationResearch::default()
            },
        ),
    ]));
    let output = pipeline.run(&request).await;

    assert!(output.passes_hard_gate);
    assert_eq!(output.summary.flagged, 3);
    assert_eq!(output.summary.critical, 0);

    let first_flags: Vec<FlagType> = output
        .results
        .iter()
        .map(|r| r.record.flags[0].flag_type.clone())
        .collect();
    assert_eq!(
        first_flags,
        vec![
            FlagType::PotentiallyAbandoned,
            FlagType::WeakAuthority,
            FlagType::Unpublished
        ]
    );
}

#[tokio::test]
async fn test_all_batches_failing_fails_closed() {
    let authority = MockAuthorityVerifier::new();
    authority.fail_all();

    let pipeline = CitationPipeline::new(authority, gatekeeper(), PipelineConfig::default())
        .with_holding_verifier(MockHoldingVerifier::default());
    let output = pipeline.run(&VerificationRequest::new(DRAFT, draft_fragments())).await;

    assert!(output.is_fail_closed());
    assert!(!output.passes_hard_gate);
    assert_eq!(output.verification_rate, VerificationRate::Error);
    assert_eq!(output.summary.verified, 0);
    assert_eq!(output.summary.removed, 0);
    assert!(output.results.is_empty());

    let value = serde_json::to_value(&output).unwrap();
    assert_eq!(value["verification_rate"], "ERROR");
    assert_eq!(value["summary"]["holding_mismatches"], -1);
}

#[tokio::test]
async fn test_failed_sub_batch_degrades_only_its_citations() {
    let draft = "A v. B, 1 F.3d 2. C v. D, 3 F.3d 4.";
    let authority = MockAuthorityVerifier::new();
    authority.add_found("1 F.3d 2", "op-1");
    authority.add_failure("3 F.3d 4");

    let config = PipelineConfig {
        batch_size: 1,
        ..PipelineConfig::default()
    };
    let pipeline = CitationPipeline::new(authority.clone(), gatekeeper(), config);
    let request = VerificationRequest::new(
        draft,
        vec![fragment(draft, "1 F.3d 2", 0), fragment(draft, "3 F.3d 4", 0)],
    );
    let output = pipeline.run(&request).await;

    assert!(!output.is_fail_closed());
    assert!(output.passes_hard_gate);
    assert_eq!(authority.call_count(), 2);
    assert_eq!(output.batch_errors.len(), 1);
    assert_eq!(output.batch_errors[0].text_block, "3 F.3d 4");

    assert_eq!(output.results[0].status, VerificationStatus::Verified);
    assert_eq!(output.results[1].status, VerificationStatus::Failed);
    assert_eq!(output.results[1].lookup, LookupOutcome::Failed);
    assert!(output.results[1].lookup_error.is_some());
    assert_eq!(output.verification_rate, VerificationRate::Percent(50.0));
    assert_eq!(output.metrics.batches_failed, 1);
}

#[tokio::test]
async fn test_panic_fails_closed() {
    let authority = MockAuthorityVerifier::new();
    authority.panic_on_lookup();

    let pipeline = CitationPipeline::new(authority, gatekeeper(), PipelineConfig::default());
    let output = pipeline.run(&VerificationRequest::new(DRAFT, draft_fragments())).await;

    assert!(output.is_fail_closed());
    assert!(!output.passes_hard_gate);
    assert!(output.error.unwrap().contains("panicked"));
}

#[tokio::test]
async fn test_lookup_timeout_fails_closed() {
    let authority = MockAuthorityVerifier::new();
    authority.add_found("100 F.3d 200", "op-2");
    authority.set_delay(Duration::from_millis(300));

    let config = PipelineConfig {
        lookup_timeout_ms: 20,
        ..PipelineConfig::default()
    };
    let draft = "Doe v. Roe, 100 F.3d 200.";
    let pipeline = CitationPipeline::new(authority, gatekeeper(), config);
    let output = pipeline
        .run(&VerificationRequest::new(draft, vec![fragment(draft, "100 F.3d 200", 0)]))
        .await;

    assert!(output.is_fail_closed());
    assert_eq!(output.verification_rate, VerificationRate::Error);
}

#[tokio::test]
async fn test_secondary_lookups_are_capped_and_charged() {
    let draft = "A v. B, 1 F.3d 2. C v. D, 3 F.3d 4. E v. F, 5 F.3d 6.";
    let authority = MockAuthorityVerifier::new();
    let secondary = MockSecondarySource::new();
    secondary.add_record("3 F.3d 4", AuthorityRecord::found("sec-1"));

    let cost = Arc::new(SessionCost::new());
    let config = PipelineConfig {
        max_secondary_lookups: 2,
        ..PipelineConfig::default()
    };
    let pipeline = CitationPipeline::new(authority, gatekeeper(), config)
        .with_secondary_source(secondary.clone())
        .with_session_cost(Arc::clone(&cost));
    let request = VerificationRequest::new(
        draft,
        vec![
            fragment(draft, "1 F.3d 2", 0),
            fragment(draft, "3 F.3d 4", 0),
            fragment(draft, "5 F.3d 6", 0),
        ],
    );

    let output = pipeline.run(&request).await;
    assert_eq!(secondary.call_count(), 2);
    assert_eq!(output.run_cost, 2);
    assert_eq!(output.session_cost, 2);
    assert_eq!(output.results[1].lookup, LookupOutcome::FoundSecondary);
    assert_eq!(output.results[0].lookup, LookupOutcome::NotFound);
    assert_eq!(output.summary.verified, 1);
    assert_eq!(output.summary.removed, 2);

    let second = pipeline.run(&request).await;
    assert_eq!(second.run_cost, 2);
    assert_eq!(second.session_cost, 4);

    cost.reset();
    assert_eq!(pipeline.session_cost().count(), 0);
}

#[tokio::test]
async fn test_secondary_disabled_makes_no_calls() {
    let draft = "A v. B, 1 F.3d 2.";
    let secondary = MockSecondarySource::new();
    let config = PipelineConfig {
        secondary_lookups: false,
        ..PipelineConfig::default()
    };
    let pipeline = CitationPipeline::new(MockAuthorityVerifier::new(), gatekeeper(), config)
        .with_secondary_source(secondary.clone());
    let output = pipeline
        .run(&VerificationRequest::new(draft, vec![fragment(draft, "1 F.3d 2", 0)]))
        .await;

    assert_eq!(secondary.call_count(), 0);
    assert_eq!(output.session_cost, 0);
    assert_eq!(output.results[0].status, VerificationStatus::Failed);
}

#[tokio::test]
async fn test_shared_cache_serves_second_run() {
    let draft = "Doe v. Roe, 100 F.3d 200.";
    let authority = MockAuthorityVerifier::new();
    authority.add_found("100 F.3d 200", "op-2");
    let cached = Arc::new(CachedAuthorityVerifier::new(authority.clone()));

    let pipeline = CitationPipeline::new(Arc::clone(&cached), gatekeeper(), PipelineConfig::default());
    let request = VerificationRequest::new(draft, vec![fragment(draft, "100 F.3d 200", 0)]);

    let first = pipeline.run(&request).await;
    let second = pipeline.run(&request).await;

    assert_eq!(first.summary.verified, 1);
    assert_eq!(second.summary.verified, 1);
    assert_eq!(authority.call_count(), 1);
    assert_eq!(cached.hits(), 1);
    assert_ne!(first.run_id, second.run_id);
}

#[tokio::test]
async fn test_quote_and_holding_checks() {
    let draft = "Doe v. Roe, 100 F.3d 200. A v. B, 1 F.3d 2.";
    let authority = MockAuthorityVerifier::new();
    authority.add_record(
        "100 F.3d 200",
        AuthorityRecord {
            opinion_text: Some("We hold that the covenant is enforceable against the employee.".into()),
            ..AuthorityRecord::found("op-2")
        },
    );
    authority.add_record(
        "1 F.3d 2",
        AuthorityRecord {
            opinion_text: Some("The injunction was properly entered.".into()),
            ..AuthorityRecord::found("op-1")
        },
    );

    let holding = MockHoldingVerifier::new(HoldingVerdict::Consistent);
    holding.add_verdict("100 F.3d 200", HoldingVerdict::Mismatch);
    holding.add_failure("1 F.3d 2");

    let pipeline = CitationPipeline::new(authority, gatekeeper(), PipelineConfig::default())
        .with_holding_verifier(holding.clone());
    let request = VerificationRequest::new(
        draft,
        vec![fragment(draft, "100 F.3d 200", 0), fragment(draft, "1 F.3d 2", 0)],
    )
    .with_assertions(vec![
        CitationAssertion {
            citation: "100 F.3d 200".into(),
            proposition: Some("Covenants are void".into()),
            quoted_text: Some("the covenant is unenforceable".into()),
        },
        CitationAssertion {
            citation: "1 F.3d 2".into(),
            proposition: Some("Injunctions are proper".into()),
            quoted_text: Some("The injunction ... entered".into()),
        },
    ]);
    let output = pipeline.run(&request).await;

    assert_eq!(holding.call_count(), 2);
    assert!(output.passes_hard_gate);
    assert_eq!(output.summary.holding_mismatches, Some(2));
    assert_eq!(output.summary.quotes_not_found, 1);
    assert_eq!(output.metrics.holding_errors, 1);

    let first = &output.results[0];
    assert_eq!(first.holding_verdict, Some(HoldingVerdict::Mismatch));
    let first_flags: Vec<FlagType> = first.record.flags.iter().map(|f| f.flag_type.clone()).collect();
    assert_eq!(first_flags, vec![FlagType::HoldingMismatch, FlagType::QuoteNotFound]);

    let second = &output.results[1];
    assert_eq!(second.holding_verdict, Some(HoldingVerdict::Unverifiable));
    assert!(!second.record.facts.quote_not_found);
    assert!(second.ellipsis.as_ref().unwrap().valid);
}

#[tokio::test]
async fn test_unaddressed_adverse_authority_requires_revision() {
    let draft = "Doe v. Roe, 100 F.3d 200, controls here.";
    let authority = MockAuthorityVerifier::new();
    authority.add_found("100 F.3d 200", "op-2");

    let mut context = ResearchContext::default();
    context.adverse_candidates.push(AdverseCandidate {
        citation: "45 N.E.3d 12".into(),
        case_name: Some("Acme v. Baker".into()),
        snippet: "We hold the non-compete unenforceable as written.".into(),
        relevance: 0.9,
    });

    let pipeline = CitationPipeline::new(authority, gatekeeper(), PipelineConfig::default());
    let output = pipeline
        .run(&VerificationRequest::new(draft, vec![fragment(draft, "100 F.3d 200", 0)]).with_research(context))
        .await;

    assert!(output.passes_hard_gate);
    assert!(output.revision_required);
    assert_eq!(output.adverse_authorities.len(), 1);
    assert_eq!(output.unaddressed_adverse.len(), 1);
    assert_eq!(output.unaddressed_adverse[0].short_case_name, "Acme");
}

#[tokio::test]
async fn test_concurrent_runs_are_isolated() {
    let authority = MockAuthorityVerifier::new();
    authority.add_found("1 F.3d 2", "op-1");
    authority.add_found("3 F.3d 4", "op-3");
    let pipeline = CitationPipeline::new(authority, gatekeeper(), PipelineConfig::default());

    let draft_a = "A v. B, 1 F.3d 2.";
    let draft_b = "C v. D, 3 F.3d 4.";
    let request_a = VerificationRequest::new(draft_a, vec![fragment(draft_a, "1 F.3d 2", 0)]);
    let request_b = VerificationRequest::new(draft_b, vec![fragment(draft_b, "3 F.3d 4", 0)]);

    let (a, b) = tokio::join!(pipeline.run(&request_a), pipeline.run(&request_b));

    assert_eq!(a.results.len(), 1);
    assert_eq!(b.results.len(), 1);
    assert_eq!(a.results[0].record.citation, "1 F.3d 2");
    assert_eq!(b.results[0].record.citation, "3 F.3d 4");
}

#[tokio::test]
async fn test_invalid_config_fails_closed() {
    let config = PipelineConfig {
        batch_size: 0,
        ..PipelineConfig::default()
    };
    let pipeline = CitationPipeline::new(MockAuthorityVerifier::new(), gatekeeper(), config);
    let output = pipeline.run(&VerificationRequest::new(DRAFT, draft_fragments())).await;
    assert!(output.is_fail_closed());
    assert!(output.error.unwrap().contains("batch_size"));
}

#[tokio::test]
async fn test_empty_draft_passes() {
    let pipeline = CitationPipeline::new(MockAuthorityVerifier::new(), gatekeeper(), PipelineConfig::default());
    let output = pipeline.run(&VerificationRequest::new("No citations.", Vec::new())).await;
    assert!(output.passes_hard_gate);
    assert_eq!(output.summary.total, 0);
    assert_eq!(output.verification_rate, VerificationRate::Percent(100.0));
}
