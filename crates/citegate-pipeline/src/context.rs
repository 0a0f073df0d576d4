//! Per-run and per-session state
//!
//! A [`RunContext`] is created for each run and dropped with it, so two
//! concurrent runs never share a prefetch map. [`SessionCost`] outlives runs
//! and is shared by handle.

use crate::metrics::RunMetrics;
use citegate_domain::{AuthorityRecord, BatchError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Outcome of looking one citation up
#[derive(Debug, Clone, PartialEq)]
pub enum LookupState {
    /// The authority database returned a matching opinion
    Found(AuthorityRecord),
    /// The database answered and had no match
    NotFound,
    /// The request carrying this citation failed or timed out
    Failed(String),
}

impl LookupState {
    /// The record, when found
    pub fn record(&self) -> Option<&AuthorityRecord> {
        match self {
            LookupState::Found(record) => Some(record),
            _ => None,
        }
    }

    /// Whether the citation still needs an answer
    pub fn is_unanswered(&self) -> bool {
        !matches!(self, LookupState::Found(_))
    }
}

/// Count of paid secondary-source calls, shared across runs
///
/// Counts calls, not successes.
#[derive(Debug, Default)]
pub struct SessionCost {
    calls: AtomicUsize,
}

impl SessionCost {
    /// New counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one call; returns the new total
    pub fn increment(&self) -> usize {
        self.calls.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Calls counted so far
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Reset to zero, e.g. at the start of a new drafting session
    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

/// State owned by one verification run
#[derive(Debug)]
pub struct RunContext {
    /// Identifier carried through logs and output
    pub run_id: String,

    /// Normalized citation string to lookup outcome
    pub prefetch: HashMap<String, LookupState>,

    /// Per-batch lookup errors, surfaced in output
    pub batch_errors: Vec<BatchError>,

    /// Counters for this run
    pub metrics: RunMetrics,

    session_cost: Arc<SessionCost>,
    cost_at_start: usize,
}

impl RunContext {
    /// Start a run against a shared session cost counter
    pub fn new(session_cost: Arc<SessionCost>) -> Self {
        let cost_at_start = session_cost.count();
        Self {
            run_id: uuid::Uuid::now_v7().to_string(),
            prefetch: HashMap::new(),
            batch_errors: Vec::new(),
            metrics: RunMetrics::new(),
            session_cost,
            cost_at_start,
        }
    }

    /// Lookup outcome for a citation
    pub fn lookup(&self, citation: &str) -> Option<&LookupState> {
        self.prefetch.get(citation)
    }

    /// Citations without a found record, in sorted order
    pub fn unanswered(&self) -> Vec<String> {
        let mut citations: Vec<String> = self
            .prefetch
            .iter()
            .filter(|(_, state)| state.is_unanswered())
            .map(|(citation, _)| citation.clone())
            .collect();
        citations.sort();
        citations
    }

    /// Shared cost counter
    pub fn session_cost(&self) -> &Arc<SessionCost> {
        &self.session_cost
    }

    /// Calls charged since this run started
    ///
    /// Approximate when several runs share one counter concurrently.
    pub fn run_cost(&self) -> usize {
        self.session_cost.count().saturating_sub(self.cost_at_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cost_counts_and_resets() {
        let cost = SessionCost::new();
        assert_eq!(cost.increment(), 1);
        assert_eq!(cost.increment(), 2);
        assert_eq!(cost.count(), 2);
        cost.reset();
        assert_eq!(cost.count(), 0);
    }

    #[test]
    fn test_run_cost_is_relative_to_start() {
        let shared = Arc::new(SessionCost::new());
        shared.increment();
        let ctx = RunContext::new(Arc::clone(&shared));
        shared.increment();
        shared.increment();
        assert_eq!(ctx.run_cost(), 2);
        assert_eq!(ctx.session_cost().count(), 3);
    }

    #[test]
    fn test_unanswered_excludes_found() {
        let mut ctx = RunContext::new(Arc::new(SessionCost::new()));
        ctx.prefetch.insert("1 F.3d 2".into(), LookupState::Found(AuthorityRecord::found("1")));
        ctx.prefetch.insert("3 F.3d 4".into(), LookupState::NotFound);
        ctx.prefetch.insert("5 F.3d 6".into(), LookupState::Failed("timeout".into()));
        assert_eq!(ctx.unanswered(), vec!["3 F.3d 4".to_string(), "5 F.3d 6".to_string()]);
    }

    #[test]
    fn test_run_ids_are_distinct() {
        let cost = Arc::new(SessionCost::new());
        let a = RunContext::new(Arc::clone(&cost));
        let b = RunContext::new(cost);
        assert_ne!(a.run_id, b.run_id);
    }
}
