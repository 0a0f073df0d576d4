//! Deterministic collaborators for tests and offline runs
//!
//! Every mock is `Clone` and shares its state behind `Arc<Mutex<_>>`, so a
//! test can hand one clone to the pipeline and inspect call counts on the
//! other.

use crate::VerifierError;
use citegate_domain::traits::{AuthorityVerifier, HoldingVerifier, SecondaryAuthoritySource};
use citegate_domain::{AuthorityRecord, BatchLookup, HoldingVerdict};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock authority database
///
/// # Examples
///
/// ```
/// use citegate_domain::traits::AuthorityVerifier;
/// use citegate_verifier::MockAuthorityVerifier;
///
/// let verifier = MockAuthorityVerifier::new();
/// verifier.add_found("100 F.3d 200", "op-1");
///
/// let lookup = verifier
///     .lookup_batch(&["100 F.3d 200".to_string(), "1 F.3d 2".to_string()])
///     .unwrap();
/// assert!(lookup.found("100 F.3d 200").is_some());
/// assert!(lookup.found("1 F.3d 2").is_none());
/// assert_eq!(verifier.call_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockAuthorityVerifier {
    records: Arc<Mutex<HashMap<String, AuthorityRecord>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    fail_all: Arc<Mutex<bool>>,
    panic_on_lookup: Arc<Mutex<bool>>,
    delay: Arc<Mutex<Option<Duration>>>,
    batches: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockAuthorityVerifier {
    /// Create an empty mock; every citation is not found
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mock from a citation-to-record map
    pub fn from_records(records: HashMap<String, AuthorityRecord>) -> Self {
        let mock = Self::new();
        *mock.records.lock().unwrap() = records;
        mock
    }

    /// Register a record for a citation
    pub fn add_record(&self, citation: impl Into<String>, record: AuthorityRecord) {
        self.records.lock().unwrap().insert(citation.into(), record);
    }

    /// Register a found citation with only an opinion id
    pub fn add_found(&self, citation: impl Into<String>, opinion_id: impl Into<String>) {
        self.add_record(citation, AuthorityRecord::found(opinion_id));
    }

    /// Make any batch containing `citation` fail
    pub fn add_failure(&self, citation: impl Into<String>) {
        self.failing.lock().unwrap().insert(citation.into());
    }

    /// Make every batch fail
    pub fn fail_all(&self) {
        *self.fail_all.lock().unwrap() = true;
    }

    /// Panic inside `lookup_batch`
    pub fn panic_on_lookup(&self) {
        *self.panic_on_lookup.lock().unwrap() = true;
    }

    /// Sleep before answering
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Number of `lookup_batch` calls
    pub fn call_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    /// Batches received, in call order
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    /// Reset the call history
    pub fn reset_call_count(&self) {
        self.batches.lock().unwrap().clear();
    }
}

impl AuthorityVerifier for MockAuthorityVerifier {
    type Error = VerifierError;

    fn lookup_batch(&self, citations: &[String]) -> Result<BatchLookup, Self::Error> {
        self.batches.lock().unwrap().push(citations.to_vec());

        if *self.panic_on_lookup.lock().unwrap() {
            panic!("mock authority verifier panicked");
        }
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        if *self.fail_all.lock().unwrap() {
            return Err(VerifierError::Communication("Mock service unreachable".to_string()));
        }
        {
            let failing = self.failing.lock().unwrap();
            if let Some(bad) = citations.iter().find(|c| failing.contains(*c)) {
                return Err(VerifierError::Communication(format!("Mock failure on '{}'", bad)));
            }
        }

        let records = self.records.lock().unwrap();
        let results = citations
            .iter()
            .filter_map(|c| records.get(c).map(|r| (c.clone(), r.clone())))
            .collect();
        Ok(BatchLookup {
            results,
            errors: Vec::new(),
        })
    }
}

/// Mock holding verifier
#[derive(Debug, Clone)]
pub struct MockHoldingVerifier {
    default_verdict: HoldingVerdict,
    verdicts: Arc<Mutex<HashMap<String, HoldingVerdict>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockHoldingVerifier {
    /// Create a mock answering `default_verdict` for every citation
    pub fn new(default_verdict: HoldingVerdict) -> Self {
        Self {
            default_verdict,
            verdicts: Arc::new(Mutex::new(HashMap::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Answer `verdict` for `citation`
    pub fn add_verdict(&self, citation: impl Into<String>, verdict: HoldingVerdict) {
        self.verdicts.lock().unwrap().insert(citation.into(), verdict);
    }

    /// Fail verification for `citation`
    pub fn add_failure(&self, citation: impl Into<String>) {
        self.failing.lock().unwrap().insert(citation.into());
    }

    /// Number of `verify_holding` calls
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockHoldingVerifier {
    fn default() -> Self {
        Self::new(HoldingVerdict::Consistent)
    }
}

impl HoldingVerifier for MockHoldingVerifier {
    type Error = VerifierError;

    fn verify_holding(
        &self,
        citation: &str,
        _proposition: &str,
        _opinion_text: &str,
    ) -> Result<HoldingVerdict, Self::Error> {
        *self.call_count.lock().unwrap() += 1;
        if self.failing.lock().unwrap().contains(citation) {
            return Err(VerifierError::Communication("Mock holding failure".to_string()));
        }
        Ok(self
            .verdicts
            .lock()
            .unwrap()
            .get(citation)
            .copied()
            .unwrap_or(self.default_verdict))
    }
}

/// Mock secondary authority source
#[derive(Debug, Clone, Default)]
pub struct MockSecondarySource {
    records: Arc<Mutex<HashMap<String, AuthorityRecord>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockSecondarySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record
    pub fn add_record(&self, citation: impl Into<String>, record: AuthorityRecord) {
        self.records.lock().unwrap().insert(citation.into(), record);
    }

    /// Fail lookups of `citation`
    pub fn add_failure(&self, citation: impl Into<String>) {
        self.failing.lock().unwrap().insert(citation.into());
    }

    /// Number of `lookup` calls
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl SecondaryAuthoritySource for MockSecondarySource {
    type Error = VerifierError;

    fn lookup(&self, citation: &str) -> Result<Option<AuthorityRecord>, Self::Error> {
        *self.call_count.lock().unwrap() += 1;
        if self.failing.lock().unwrap().contains(citation) {
            return Err(VerifierError::Timeout(format!("Mock secondary timeout on '{}'", citation)));
        }
        Ok(self.records.lock().unwrap().get(citation).cloned())
    }
}
