//! Citegate Verifier Layer
//!
//! Implementations of the external collaborator traits from
//! `citegate-domain`.
//!
//! # Implementations
//!
//! - `CourtListenerClient`: authority database (batch citation lookup) and
//!   secondary search source
//! - `OllamaHoldingVerifier`: holding/proposition verification with a local model
//! - `CachedAuthorityVerifier`: shared positive-result cache for any verifier
//! - `FixtureAuthorityVerifier`: offline verifier backed by a JSON fixture
//! - `MockAuthorityVerifier`, `MockHoldingVerifier`, `MockSecondarySource`:
//!   deterministic mocks with call counters and failure injection
//!
//! All implementations are blocking. The pipeline calls them from the
//! blocking thread pool under its own timeouts.

#![warn(missing_docs)]

pub mod cache;
pub mod courtlistener;
mod error;
pub mod fixture;
pub mod mock;
pub mod ollama;

pub use cache::CachedAuthorityVerifier;
pub use courtlistener::CourtListenerClient;
pub use error::VerifierError;
pub use fixture::FixtureAuthorityVerifier;
pub use mock::{MockAuthorityVerifier, MockHoldingVerifier, MockSecondarySource};
pub use ollama::OllamaHoldingVerifier;
