//! Counters collected during one pipeline run

use serde::Serialize;

/// Metrics collected during a verification run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunMetrics {
    /// Fragments received from extraction
    pub fragments_in: usize,

    /// Statutory citations excluded before lookup
    pub statutes_excluded: usize,

    /// Citations sent to the authority database
    pub lookups_requested: usize,

    /// Lookup sub-batches sent
    pub batches_sent: usize,

    /// Lookup sub-batches that failed or timed out
    pub batches_failed: usize,

    /// Requests abandoned at their deadline
    pub timeouts: usize,

    /// Secondary-source calls made
    pub secondary_calls: usize,

    /// Citations recovered by the secondary source
    pub secondary_hits: usize,

    /// Holding verifications requested
    pub holding_calls: usize,

    /// Holding verifications that errored or timed out
    pub holding_errors: usize,

    /// Wall-clock time for the run (milliseconds)
    pub elapsed_ms: u64,
}

impl RunMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one lookup sub-batch
    pub fn record_batch(&mut self, citations: usize, failed: bool) {
        self.batches_sent += 1;
        self.lookups_requested += citations;
        if failed {
            self.batches_failed += 1;
        }
    }

    /// Record a request abandoned at its deadline
    pub fn record_timeout(&mut self) {
        self.timeouts += 1;
    }

    /// Record a secondary-source call
    pub fn record_secondary(&mut self, hit: bool) {
        self.secondary_calls += 1;
        if hit {
            self.secondary_hits += 1;
        }
    }

    /// Record a holding verification
    pub fn record_holding(&mut self, errored: bool) {
        self.holding_calls += 1;
        if errored {
            self.holding_errors += 1;
        }
    }

    /// Whether every sub-batch sent so far failed
    pub fn all_batches_failed(&self) -> bool {
        self.batches_sent > 0 && self.batches_failed == self.batches_sent
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let lines = vec![
            "Pipeline Metrics Summary".to_string(),
            "========================".to_string(),
            format!(
                "Fragments: {} ({} statutes excluded)",
                self.fragments_in, self.statutes_excluded
            ),
            format!(
                "Lookups: {} citations in {} batches ({} failed, {} timed out)",
                self.lookups_requested, self.batches_sent, self.batches_failed, self.timeouts
            ),
            format!(
                "Secondary source: {} calls, {} recovered",
                self.secondary_calls, self.secondary_hits
            ),
            format!(
                "Holding checks: {} ({} errors)",
                self.holding_calls, self.holding_errors
            ),
            format!("Elapsed: {} ms", self.elapsed_ms),
        ];
        lines.join("\n")
    }
}
