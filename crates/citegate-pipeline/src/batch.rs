//! Batched authority lookups under a concurrency bound
//!
//! Citations are split into sub-batches of `batch_size`. Each sub-batch runs
//! on the blocking pool under its own deadline, with at most
//! `max_concurrent_batches` in flight. A failed sub-batch only marks its own
//! citations as failed; the run is fatal only when every sub-batch fails.

use crate::config::PipelineConfig;
use crate::context::LookupState;
use crate::error::PipelineError;
use crate::metrics::RunMetrics;
use citegate_domain::traits::AuthorityVerifier;
use citegate_domain::{BatchError, BatchLookup};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Separator used when a sub-batch is reported as one text block
pub const TEXT_BLOCK_SEPARATOR: &str = "; ";

/// Merged result of every sub-batch
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Lookup state per citation
    pub lookups: HashMap<String, LookupState>,
    /// One entry per failed sub-batch or partial failure
    pub errors: Vec<BatchError>,
}

/// Split `citations` into chunks of at most `batch_size`
pub fn chunk_citations(citations: &[String], batch_size: usize) -> Vec<Vec<String>> {
    citations
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Look up every citation, batch by batch
///
/// Returns [`PipelineError::ServiceUnavailable`] when every sub-batch failed
/// and [`PipelineError::TaskPanicked`] when a lookup panicked.
pub async fn lookup_all<A>(
    verifier: Arc<A>,
    citations: &[String],
    config: &PipelineConfig,
    metrics: &mut RunMetrics,
) -> Result<BatchOutcome, PipelineError>
where
    A: AuthorityVerifier + Send + Sync + 'static,
    A::Error: Display,
{
    let mut outcome = BatchOutcome::default();
    if citations.is_empty() {
        return Ok(outcome);
    }

    let chunks = chunk_citations(citations, config.batch_size);
    let total = chunks.len();
    let deadline = config.lookup_timeout();
    debug!(
        "Looking up {} citations in {} batches ({} concurrent)",
        citations.len(),
        total,
        config.max_concurrent_batches
    );

    let results: Vec<_> = stream::iter(chunks)
        .map(|chunk| {
            let verifier = Arc::clone(&verifier);
            async move {
                let batch = chunk.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    verifier.lookup_batch(&batch).map_err(|e| e.to_string())
                });
                (chunk, timeout(deadline, handle).await)
            }
        })
        .buffer_unordered(config.max_concurrent_batches.max(1))
        .collect()
        .await;

    for (chunk, result) in results {
        match result {
            Ok(Ok(Ok(lookup))) => {
                metrics.record_batch(chunk.len(), false);
                apply_lookup(&mut outcome, &chunk, lookup);
            }
            Ok(Ok(Err(e))) => {
                warn!("Lookup batch of {} citations failed: {}", chunk.len(), e);
                metrics.record_batch(chunk.len(), true);
                fail_chunk(&mut outcome, &chunk, e);
            }
            Ok(Err(join_err)) => return Err(join_err.into()),
            Err(_) => {
                warn!(
                    "Lookup batch of {} citations timed out after {:?}",
                    chunk.len(),
                    deadline
                );
                metrics.record_batch(chunk.len(), true);
                metrics.record_timeout();
                fail_chunk(&mut outcome, &chunk, format!("Timed out after {:?}", deadline));
            }
        }
    }

    if metrics.all_batches_failed() {
        return Err(PipelineError::ServiceUnavailable(format!(
            "all {} lookup batches failed",
            total
        )));
    }

    Ok(outcome)
}

fn apply_lookup(outcome: &mut BatchOutcome, chunk: &[String], lookup: BatchLookup) {
    let mut failed: HashMap<&str, &str> = HashMap::new();
    for error in &lookup.errors {
        for citation in error.text_block.split(TEXT_BLOCK_SEPARATOR) {
            failed.insert(citation.trim(), error.error.as_str());
        }
    }

    for citation in chunk {
        let state = match (lookup.found(citation), failed.get(citation.as_str())) {
            (Some(record), _) => LookupState::Found(record.clone()),
            (None, Some(error)) => LookupState::Failed(error.to_string()),
            (None, None) => LookupState::NotFound,
        };
        outcome.lookups.insert(citation.clone(), state);
    }

    let unique: HashSet<&str> = chunk.iter().map(String::as_str).collect();
    for error in lookup.errors {
        if error
            .text_block
            .split(TEXT_BLOCK_SEPARATOR)
            .any(|c| unique.contains(c.trim()))
        {
            outcome.errors.push(error);
        }
    }
}

fn fail_chunk(outcome: &mut BatchOutcome, chunk: &[String], error: String) {
    for citation in chunk {
        outcome
            .lookups
            .insert(citation.clone(), LookupState::Failed(error.clone()));
    }
    outcome.errors.push(BatchError {
        text_block: chunk.join(TEXT_BLOCK_SEPARATOR),
        error,
        recoverable: true,
    });
}
