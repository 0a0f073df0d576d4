//! Offline authority verifier backed by a JSON fixture
//!
//! The fixture maps citation strings to authority records:
//!
//! ```json
//! { "100 F.3d 200": { "found": true, "opinion_id": "123", "case_name": "Smith v. Jones" } }
//! ```

use crate::VerifierError;
use citegate_domain::traits::{AuthorityVerifier, SecondaryAuthoritySource};
use citegate_domain::{AuthorityRecord, BatchLookup};
use std::collections::HashMap;
use std::path::Path;

/// Authority verifier answering from a fixed record set
#[derive(Debug, Clone, Default)]
pub struct FixtureAuthorityVerifier {
    records: HashMap<String, AuthorityRecord>,
}

impl FixtureAuthorityVerifier {
    /// Parse a fixture from JSON
    pub fn from_json(json: &str) -> Result<Self, VerifierError> {
        let records = serde_json::from_str(json)
            .map_err(|e| VerifierError::Config(format!("Invalid authority fixture: {}", e)))?;
        Ok(Self { records })
    }

    /// Load a fixture file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, VerifierError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| VerifierError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the fixture has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AuthorityVerifier for FixtureAuthorityVerifier {
    type Error = VerifierError;

    fn lookup_batch(&self, citations: &[String]) -> Result<BatchLookup, Self::Error> {
        let results = citations
            .iter()
            .filter_map(|c| self.records.get(c).map(|r| (c.clone(), r.clone())))
            .collect();
        Ok(BatchLookup {
            results,
            errors: Vec::new(),
        })
    }
}

impl SecondaryAuthoritySource for FixtureAuthorityVerifier {
    type Error = VerifierError;

    fn lookup(&self, citation: &str) -> Result<Option<AuthorityRecord>, Self::Error> {
        Ok(self.records.get(citation).filter(|r| r.found).cloned())
    }
}
