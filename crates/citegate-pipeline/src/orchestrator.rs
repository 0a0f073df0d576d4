//! The verification run
//!
//! ```text
//! fragments → route (drop statutes) → de-duplicate → records → resolve shorthand
//!   → batched lookups → secondary fallback → quotes/holdings → strength + flags
//!   → adverse authority → hard gate
//! ```
//!
//! [`CitationPipeline::run`] always returns an output. Any fatal condition,
//! including a panic anywhere in the run, produces a fail-closed output with
//! the gate shut.

use crate::batch;
use crate::config::PipelineConfig;
use crate::context::{LookupState, RunContext, SessionCost};
use crate::error::PipelineError;
use crate::services::{HoldingService, SecondaryService};
use crate::types::{
    AggregateSummary, CitationResult, LookupOutcome, PipelineOutput, VerificationRate,
    VerificationRequest,
};
use citegate_domain::traits::{AuthorityVerifier, HoldingVerifier, SecondaryAuthoritySource};
use citegate_domain::{
    AuthorityRecord, CitationId, CitationRecord, CitationType, HoldingVerdict,
    RawCitationFragment, ShorthandResolution, StrengthRating, VerificationStatus,
};
use citegate_extractor::{
    classify, deduplicate, is_unpublished_reporter, normalize_whitespace, parse_reporter_citation,
    parse_short_form, recover_case_name, recover_supra_name,
};
use citegate_gatekeeper::{
    check_adverse_authorities_addressed, compile_flags_for_citation, detect_adverse_authorities,
    quote_found_in_source, resolve_all, supra_hint, to_strength_score, validate_ellipsis, Gatekeeper,
};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Citation integrity pipeline
///
/// Generic over the primary authority database; the holding verifier and
/// secondary source are optional.
///
/// # Examples
///
/// ```
/// use citegate_domain::RawCitationFragment;
/// use citegate_gatekeeper::{Gatekeeper, ValidationConfig};
/// use citegate_pipeline::{CitationPipeline, PipelineConfig, VerificationRequest};
/// use citegate_verifier::MockAuthorityVerifier;
///
/// # tokio_test::block_on(async {
/// let authority = MockAuthorityVerifier::new();
/// authority.add_found("100 F.3d 200", "op-1");
///
/// let gatekeeper = Gatekeeper::new(ValidationConfig::default()).unwrap();
/// let pipeline = CitationPipeline::new(authority, gatekeeper, PipelineConfig::default());
///
/// let draft = "Smith v. Jones, 100 F.3d 200 (9th Cir. 1996).";
/// let fragments = vec![RawCitationFragment::new("100 F.3d 200", 16, 28)];
/// let output = pipeline.run(&VerificationRequest::new(draft, fragments)).await;
///
/// assert!(output.passes_hard_gate);
/// assert_eq!(output.summary.verified, 1);
/// # });
/// ```
pub struct CitationPipeline<A> {
    authority: Arc<A>,
    holding: Option<Arc<dyn HoldingService>>,
    secondary: Option<Arc<dyn SecondaryService>>,
    gatekeeper: Gatekeeper,
    config: PipelineConfig,
    session_cost: Arc<SessionCost>,
}

struct HoldingJob {
    index: usize,
    citation: String,
    proposition: String,
    opinion_text: String,
}

/// Fragments split by where they go next
struct Routed<'a> {
    full: Vec<&'a RawCitationFragment>,
    shorthand: Vec<(&'a RawCitationFragment, CitationType)>,
}

impl<A> CitationPipeline<A>
where
    A: AuthorityVerifier + Send + Sync + 'static,
    A::Error: Display,
{
    /// Create a pipeline over a primary authority database
    pub fn new(authority: A, gatekeeper: Gatekeeper, config: PipelineConfig) -> Self {
        Self {
            authority: Arc::new(authority),
            holding: None,
            secondary: None,
            gatekeeper,
            config,
            session_cost: Arc::new(SessionCost::new()),
        }
    }

    /// Check asserted propositions against opinion text
    pub fn with_holding_verifier<H>(mut self, verifier: H) -> Self
    where
        H: HoldingVerifier + Send + Sync + 'static,
        H::Error: Display,
    {
        let service: Arc<dyn HoldingService> = Arc::new(verifier);
        self.holding = Some(service);
        self
    }

    /// Retry primary misses against a slower source
    pub fn with_secondary_source<S>(mut self, source: S) -> Self
    where
        S: SecondaryAuthoritySource + Send + Sync + 'static,
        S::Error: Display,
    {
        let service: Arc<dyn SecondaryService> = Arc::new(source);
        self.secondary = Some(service);
        self
    }

    /// Share a cost counter with other pipelines in the same session
    pub fn with_session_cost(mut self, session_cost: Arc<SessionCost>) -> Self {
        self.session_cost = session_cost;
        self
    }

    /// Session cost counter
    pub fn session_cost(&self) -> &Arc<SessionCost> {
        &self.session_cost
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Verify every citation in a draft and decide the hard gate
    pub async fn run(&self, request: &VerificationRequest) -> PipelineOutput {
        let mut ctx = RunContext::new(Arc::clone(&self.session_cost));
        let run_id = ctx.run_id.clone();
        info!(
            "Starting verification run {} ({} fragments)",
            run_id,
            request.fragments.len()
        );

        let result = AssertUnwindSafe(self.execute(request, &mut ctx))
            .catch_unwind()
            .await;

        let reason = match result {
            Ok(Ok(output)) => return output,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("Pipeline panicked: {}", panic_message(panic.as_ref())),
        };
        error!("Run {} failed closed: {}", run_id, reason);
        PipelineOutput::fail_closed(
            run_id,
            request.tier.clone(),
            request.phase.clone(),
            reason,
            self.session_cost.count(),
        )
    }

    async fn execute(
        &self,
        request: &VerificationRequest,
        ctx: &mut RunContext,
    ) -> Result<PipelineOutput, PipelineError> {
        self.config.validate().map_err(PipelineError::Config)?;
        let started = Instant::now();
        ctx.metrics.fragments_in = request.fragments.len();

        let routed = route_fragments(&request.fragments);
        ctx.metrics.statutes_excluded =
            request.fragments.len() - routed.full.len() - routed.shorthand.len();

        let raw: Vec<String> = routed.full.iter().map(|f| f.text.clone()).collect();
        let dedup = deduplicate(&raw);
        let mut records = build_records(&request.draft, &routed, &dedup.unique);

        let report = resolve_all(&records, self.gatekeeper.config());
        let resolutions: HashMap<CitationId, ShorthandResolution> = report
            .resolutions
            .iter()
            .map(|r| (r.citation_id, r.clone()))
            .collect();
        for record in &mut records {
            if let Some(resolution) = resolutions.get(&record.id) {
                record.antecedent_id = resolution.antecedent_id;
            }
        }

        let outcome = batch::lookup_all(
            Arc::clone(&self.authority),
            &dedup.unique,
            &self.config,
            &mut ctx.metrics,
        )
        .await?;
        ctx.prefetch.extend(outcome.lookups);
        ctx.batch_errors.extend(outcome.errors);

        let recovered = self.secondary_fallback(ctx).await?;

        let (mut results, keys, jobs) = self.assess(request, records, &resolutions, ctx, &recovered);
        self.verify_holdings(jobs, &mut results, ctx).await?;
        self.compile_flags(request, &mut results, &keys);

        let analysis =
            detect_adverse_authorities(&request.research.adverse_candidates, self.gatekeeper.config());
        let unaddressed: Vec<_> = check_adverse_authorities_addressed(&request.draft, &analysis.adverse)
            .into_iter()
            .filter(|check| !check.addressed)
            .collect();
        let revision_required = !unaddressed.is_empty();
        if revision_required {
            warn!(
                "{} adverse authorities are not addressed in the draft",
                unaddressed.len()
            );
        }

        let summary = self.summarize(&results);
        let passes_hard_gate = !results.iter().any(|r| r.record.has_critical_flag());
        let verification_rate = VerificationRate::from_counts(summary.verified, summary.total);
        ctx.metrics.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            "Run {} complete: {}/{} verified, {} removed, gate {}",
            ctx.run_id,
            summary.verified,
            summary.total,
            summary.removed,
            if passes_hard_gate { "open" } else { "closed" }
        );
        debug!("{}", ctx.metrics.summary());

        Ok(PipelineOutput {
            run_id: ctx.run_id.clone(),
            tier: request.tier.clone(),
            phase: request.phase.clone(),
            passes_hard_gate,
            error: None,
            verification_rate,
            summary,
            results,
            normalization: dedup.stats,
            duplicates_removed: dedup.duplicates_removed,
            incomplete_removed: dedup.incomplete_removed,
            resolution_stats: report.stats,
            adverse_authorities: analysis.adverse,
            unaddressed_adverse: unaddressed,
            revision_required,
            batch_errors: std::mem::take(&mut ctx.batch_errors),
            run_cost: ctx.run_cost(),
            session_cost: ctx.session_cost().count(),
            metrics: ctx.metrics.clone(),
        })
    }

    /// Retry unanswered citations against the secondary source
    ///
    /// Every call is charged to the session cost, whatever its outcome.
    async fn secondary_fallback(&self, ctx: &mut RunContext) -> Result<HashSet<String>, PipelineError> {
        let mut recovered = HashSet::new();
        let Some(source) = self.secondary.as_ref() else {
            return Ok(recovered);
        };
        if !self.config.secondary_lookups {
            return Ok(recovered);
        }

        let pending = ctx.unanswered();
        if pending.is_empty() {
            return Ok(recovered);
        }
        let limit = self.config.max_secondary_lookups;
        if pending.len() > limit {
            warn!(
                "{} unfound citations exceed the secondary lookup limit of {}",
                pending.len(),
                limit
            );
        }

        let deadline = self.config.lookup_timeout();
        let cost = Arc::clone(ctx.session_cost());
        let results: Vec<_> = stream::iter(pending.into_iter().take(limit))
            .map(|citation| {
                let source = Arc::clone(source);
                let cost = Arc::clone(&cost);
                async move {
                    cost.increment();
                    let query = citation.clone();
                    let handle = tokio::task::spawn_blocking(move || source.fetch(&query));
                    (citation, timeout(deadline, handle).await)
                }
            })
            .buffer_unordered(self.config.max_concurrent_batches.max(1))
            .collect()
            .await;

        for (citation, result) in results {
            match result {
                Ok(Ok(Ok(Some(record)))) if record.found => {
                    debug!("Secondary source recovered '{}'", citation);
                    ctx.metrics.record_secondary(true);
                    ctx.prefetch
                        .insert(citation.clone(), LookupState::Found(record));
                    recovered.insert(citation);
                }
                Ok(Ok(Ok(_))) => ctx.metrics.record_secondary(false),
                Ok(Ok(Err(e))) => {
                    warn!("Secondary lookup failed for '{}': {}", citation, e);
                    ctx.metrics.record_secondary(false);
                }
                Ok(Err(join_err)) => return Err(join_err.into()),
                Err(_) => {
                    warn!("Secondary lookup timed out for '{}'", citation);
                    ctx.metrics.record_secondary(false);
                    ctx.metrics.record_timeout();
                }
            }
        }

        Ok(recovered)
    }

    /// Attach lookup outcomes and the cheap per-citation facts
    ///
    /// Returns results in document order, the authority key each result was
    /// judged under, and the holding checks still to run.
    fn assess(
        &self,
        request: &VerificationRequest,
        records: Vec<CitationRecord>,
        resolutions: &HashMap<CitationId, ShorthandResolution>,
        ctx: &RunContext,
        recovered: &HashSet<String>,
    ) -> (Vec<CitationResult>, Vec<Option<String>>, Vec<HoldingJob>) {
        let citation_by_id: HashMap<CitationId, String> = records
            .iter()
            .filter(|r| r.citation_type == CitationType::FullCase)
            .map(|r| (r.id, r.citation.clone()))
            .collect();

        let mut results = Vec::with_capacity(records.len());
        let mut keys = Vec::with_capacity(records.len());
        let mut jobs = Vec::new();

        for mut record in records {
            let inherited = record.citation_type.is_shorthand();
            let key = if inherited {
                record
                    .antecedent_id
                    .and_then(|id| citation_by_id.get(&id).cloned())
            } else {
                Some(record.citation.clone())
            };

            let (lookup, authority, lookup_error) = match &key {
                None => (LookupOutcome::Unresolved, None, None),
                Some(k) => match ctx.lookup(k) {
                    Some(LookupState::Found(found)) => {
                        let outcome = if inherited {
                            LookupOutcome::Inherited
                        } else if recovered.contains(k) {
                            LookupOutcome::FoundSecondary
                        } else {
                            LookupOutcome::Found
                        };
                        (outcome, Some(found.clone()), None)
                    }
                    Some(LookupState::Failed(e)) => (LookupOutcome::Failed, None, Some(e.clone())),
                    Some(LookupState::NotFound) | None => (LookupOutcome::NotFound, None, None),
                },
            };

            if let Some(k) = &key {
                if let Some(research) = request.research.for_citation(k) {
                    record.facts.is_bad_law = research.bad_law;
                }
                let unpublished_reporter = parse_reporter_citation(k)
                    .map(|p| is_unpublished_reporter(&p.reporter))
                    .unwrap_or(false);
                record.facts.is_unpublished = unpublished_reporter
                    || authority.as_ref().is_some_and(AuthorityRecord::is_unpublished);
            }

            let opinion_text = authority.as_ref().and_then(|a| a.opinion_text.as_deref());
            let assertion = request.assertion_for(&record.citation);
            let mut ellipsis = None;
            if let Some(quoted) = assertion.and_then(|a| a.quoted_text.as_deref()) {
                ellipsis = Some(validate_ellipsis(quoted, opinion_text, self.gatekeeper.config()));
                if let Some(text) = opinion_text {
                    record.facts.quote_not_found = !quote_found_in_source(quoted, text);
                }
            }

            if let (Some(_), Some(proposition), Some(text)) = (
                self.holding.as_ref(),
                assertion.and_then(|a| a.proposition.as_deref()),
                opinion_text,
            ) {
                jobs.push(HoldingJob {
                    index: results.len(),
                    citation: key.clone().unwrap_or_else(|| record.citation.clone()),
                    proposition: proposition.to_string(),
                    opinion_text: text.to_string(),
                });
            }

            results.push(CitationResult {
                resolution: resolutions.get(&record.id).cloned(),
                record,
                status: VerificationStatus::Failed,
                lookup,
                lookup_error,
                authority,
                ellipsis,
                holding_verdict: None,
            });
            keys.push(key);
        }

        (results, keys, jobs)
    }

    /// Run holding checks concurrently
    ///
    /// An error or timeout counts as `UNVERIFIABLE`, which flags a mismatch.
    async fn verify_holdings(
        &self,
        jobs: Vec<HoldingJob>,
        results: &mut [CitationResult],
        ctx: &mut RunContext,
    ) -> Result<(), PipelineError> {
        let Some(service) = self.holding.as_ref() else {
            return Ok(());
        };
        if jobs.is_empty() {
            return Ok(());
        }

        let deadline = self.config.holding_timeout();
        let verdicts: Vec<_> = stream::iter(jobs)
            .map(|job| {
                let service = Arc::clone(service);
                async move {
                    let index = job.index;
                    let citation = job.citation.clone();
                    let handle = tokio::task::spawn_blocking(move || {
                        service.verify(&job.citation, &job.proposition, &job.opinion_text)
                    });
                    (index, citation, timeout(deadline, handle).await)
                }
            })
            .buffer_unordered(self.config.max_concurrent_holdings.max(1))
            .collect()
            .await;

        for (index, citation, result) in verdicts {
            let verdict = match result {
                Ok(Ok(Ok(verdict))) => {
                    ctx.metrics.record_holding(false);
                    verdict
                }
                Ok(Ok(Err(e))) => {
                    warn!("Holding check failed for '{}': {}", citation, e);
                    ctx.metrics.record_holding(true);
                    HoldingVerdict::Unverifiable
                }
                Ok(Err(join_err)) => return Err(join_err.into()),
                Err(_) => {
                    warn!("Holding check timed out for '{}'", citation);
                    ctx.metrics.record_holding(true);
                    ctx.metrics.record_timeout();
                    HoldingVerdict::Unverifiable
                }
            };
            let result = &mut results[index];
            result.record.facts.holding_mismatch = !verdict.supports();
            result.holding_verdict = Some(verdict);
        }
        Ok(())
    }

    /// Strength scores, flags and final status
    fn compile_flags(
        &self,
        request: &VerificationRequest,
        results: &mut [CitationResult],
        keys: &[Option<String>],
    ) {
        for (result, key) in results.iter_mut().zip(keys) {
            let strength = key
                .as_deref()
                .and_then(|k| request.research.for_citation(k))
                .and_then(|research| {
                    research.citing_opinion_count.map(|count| {
                        to_strength_score(
                            count,
                            research.citing_opinions_last_10_years,
                            research.rating.unwrap_or(StrengthRating::InsufficientData),
                            self.gatekeeper.config(),
                        )
                    })
                });

            result.record.strength_score = strength;
            result.record.flags = compile_flags_for_citation(&result.record, strength.as_ref(), self.gatekeeper.config());
            result.status = match (result.lookup.is_found(), result.record.flags.is_empty()) {
                (false, _) => VerificationStatus::Failed,
                (true, true) => VerificationStatus::Verified,
                (true, false) => VerificationStatus::Flagged,
            };
        }
    }

    fn summarize(&self, results: &[CitationResult]) -> AggregateSummary {
        AggregateSummary {
            total: results.len(),
            verified: count_where(results, |r| r.lookup.is_found()),
            flagged: count_where(results, |r| r.status == VerificationStatus::Flagged),
            removed: count_where(results, |r| r.status == VerificationStatus::Failed),
            critical: count_where(results, |r| r.record.has_critical_flag()),
            holding_mismatches: self
                .holding
                .as_ref()
                .map(|_| count_where(results, |r| r.record.facts.holding_mismatch)),
            quotes_not_found: count_where(results, |r| r.record.facts.quote_not_found),
            ellipsis_errors: count_where(results, |r| {
                r.ellipsis.as_ref().is_some_and(|e| !e.valid)
            }),
        }
    }
}

fn count_where(results: &[CitationResult], pred: impl Fn(&CitationResult) -> bool) -> usize {
    results.iter().filter(|r| pred(r)).count()
}

/// Split fragments into reporter citations and shorthand; statutes are dropped
fn route_fragments(fragments: &[RawCitationFragment]) -> Routed<'_> {
    let mut routed = Routed {
        full: Vec::new(),
        shorthand: Vec::new(),
    };
    for fragment in fragments {
        let kind = fragment
            .citation_type
            .unwrap_or_else(|| classify(&fragment.text));
        match kind {
            CitationType::Statute => {
                warn!("Excluding statutory citation '{}' from case-law checks", fragment.text);
            }
            k if k.is_shorthand() => routed.shorthand.push((fragment, k)),
            _ => routed.full.push(fragment),
        }
    }
    routed
}

/// One record per occurrence of a kept reporter citation plus one per
/// shorthand fragment, in document order
///
/// A repeated citation keeps every occurrence so that shorthand resolves to
/// the nearest mention. Occurrences are keyed by the kept string they match
/// ignoring case; incomplete and truncated fragments match none and are
/// dropped.
fn build_records(draft: &str, routed: &Routed<'_>, unique: &[String]) -> Vec<CitationRecord> {
    let mut records = Vec::with_capacity(routed.full.len() + routed.shorthand.len());
    let mut seen: HashSet<(usize, &str)> = HashSet::new();

    for fragment in &routed.full {
        let text = normalize_whitespace(&fragment.text).to_lowercase();
        let Some(citation) = unique.iter().find(|u| u.to_lowercase() == text) else {
            continue;
        };
        if !seen.insert((fragment.start, citation.as_str())) {
            continue;
        }

        let (plaintiff, defendant) = match (&fragment.plaintiff, &fragment.defendant) {
            (Some(p), Some(d)) => (Some(p.clone()), Some(d.clone())),
            _ => match recover_case_name(draft, fragment.start) {
                Some(name) => (Some(name.plaintiff), Some(name.defendant)),
                None => (None, None),
            },
        };

        let mut record =
            CitationRecord::new(citation.clone(), CitationType::FullCase, fragment.start, fragment.end)
                .with_parties(plaintiff, defendant);
        record.parsed = parse_reporter_citation(citation);
        records.push(record);
    }

    for (fragment, kind) in &routed.shorthand {
        let text = normalize_whitespace(&fragment.text);
        let mut record = CitationRecord::new(text.clone(), *kind, fragment.start, fragment.end);
        match kind {
            CitationType::ShortCase => record.parsed = parse_short_form(&text),
            CitationType::Supra if supra_hint(&text).is_none() => {
                record.plaintiff = fragment
                    .plaintiff
                    .clone()
                    .or_else(|| recover_supra_name(draft, fragment.start));
            }
            _ => {}
        }
        records.push(record);
    }

    records.sort_by_key(|r| r.start);
    records
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
