//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the pipeline and the services it
//! consults. Implementations live in `citegate-verifier`. Calls are blocking;
//! the pipeline runs them on the blocking pool under its own timeouts.

use crate::authority::{AuthorityRecord, BatchLookup, HoldingVerdict};
use std::sync::Arc;

/// Primary authority database
pub trait AuthorityVerifier {
    /// Error type for lookups
    type Error;

    /// Look up many citation strings in one outbound call
    ///
    /// An `Err` means the whole batch failed. Partial failures inside the
    /// batch are reported in [`BatchLookup::errors`].
    fn lookup_batch(&self, citations: &[String]) -> Result<BatchLookup, Self::Error>;
}

/// Holding/proposition verifier
pub trait HoldingVerifier {
    /// Error type for verification calls
    type Error;

    /// Judge whether `opinion_text` supports `proposition`
    fn verify_holding(
        &self,
        citation: &str,
        proposition: &str,
        opinion_text: &str,
    ) -> Result<HoldingVerdict, Self::Error>;
}

/// Slower authority source consulted only on a primary miss
pub trait SecondaryAuthoritySource {
    /// Error type for lookups
    type Error;

    /// Look up a single citation; `Ok(None)` when the source has no record
    fn lookup(&self, citation: &str) -> Result<Option<AuthorityRecord>, Self::Error>;
}

// Shared handles delegate, so one cached verifier can serve many pipelines
impl<T: AuthorityVerifier + ?Sized> AuthorityVerifier for Arc<T> {
    type Error = T::Error;

    fn lookup_batch(&self, citations: &[String]) -> Result<BatchLookup, Self::Error> {
        (**self).lookup_batch(citations)
    }
}

impl<T: HoldingVerifier + ?Sized> HoldingVerifier for Arc<T> {
    type Error = T::Error;

    fn verify_holding(
        &self,
        citation: &str,
        proposition: &str,
        opinion_text: &str,
    ) -> Result<HoldingVerdict, Self::Error> {
        (**self).verify_holding(citation, proposition, opinion_text)
    }
}

impl<T: SecondaryAuthoritySource + ?Sized> SecondaryAuthoritySource for Arc<T> {
    type Error = T::Error;

    fn lookup(&self, citation: &str) -> Result<Option<AuthorityRecord>, Self::Error> {
        (**self).lookup(citation)
    }
}
