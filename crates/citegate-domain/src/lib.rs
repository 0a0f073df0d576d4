//! Citegate Domain Layer
//!
//! Core data model for the citation integrity pipeline. This crate holds the
//! value types every other layer passes around and the trait seams for the
//! external collaborators (authority database, holding verifier, secondary
//! source). It carries no I/O and no async runtime.
//!
//! ## Key Concepts
//!
//! - **Citation record**: one case-law citation found in a draft, with its
//!   position, type, antecedent link and verification facts
//! - **Flag**: a typed, priority-ranked finding attached to a citation
//! - **Strength score**: how heavily later opinions rely on an authority
//! - **Adverse authority**: a precedent whose outcome cuts against the draft
//!
//! ## Architecture
//!
//! - Pure data and small derivations (priorities, severities, name matching)
//! - Infrastructure implementations live in `citegate-verifier`
//! - Orchestration lives in `citegate-pipeline`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adverse;
pub mod authority;
pub mod citation;
pub mod ellipsis;
pub mod flag;
pub mod resolution;
pub mod strength;
pub mod traits;

// Re-exports for convenience
pub use adverse::{AdverseAuthority, AdverseCandidate};
pub use authority::{AuthorityRecord, BatchError, BatchLookup, HoldingVerdict};
pub use citation::{
    CitationAssertion, CitationId, CitationRecord, CitationType, ExtractionOrigin,
    NormalizedCitation, ParsedCitation, RawCitationFragment, VerificationFacts,
    VerificationStatus,
};
pub use ellipsis::{EllipsisIssue, EllipsisIssueType, EllipsisValidationResult, IssueSeverity};
pub use flag::{CitationFlag, FlagSeverity, FlagType};
pub use resolution::{ResolutionConfidence, ShorthandResolution};
pub use strength::{StrengthRating, StrengthScore};
