//! Object-safe views of the optional collaborators
//!
//! The domain traits carry an associated error type, which keeps them out of
//! `dyn`. The pipeline only ever logs or records these errors, so they are
//! rendered to strings at this seam.

use citegate_domain::traits::{HoldingVerifier, SecondaryAuthoritySource};
use citegate_domain::{AuthorityRecord, HoldingVerdict};
use std::fmt::Display;

pub(crate) trait HoldingService: Send + Sync {
    fn verify(
        &self,
        citation: &str,
        proposition: &str,
        opinion_text: &str,
    ) -> Result<HoldingVerdict, String>;
}

impl<H> HoldingService for H
where
    H: HoldingVerifier + Send + Sync,
    H::Error: Display,
{
    fn verify(
        &self,
        citation: &str,
        proposition: &str,
        opinion_text: &str,
    ) -> Result<HoldingVerdict, String> {
        self.verify_holding(citation, proposition, opinion_text)
            .map_err(|e| e.to_string())
    }
}

pub(crate) trait SecondaryService: Send + Sync {
    fn fetch(&self, citation: &str) -> Result<Option<AuthorityRecord>, String>;
}

impl<S> SecondaryService for S
where
    S: SecondaryAuthoritySource + Send + Sync,
    S::Error: Display,
{
    fn fetch(&self, citation: &str) -> Result<Option<AuthorityRecord>, String> {
        self.lookup(citation).map_err(|e| e.to_string())
    }
}
