//! Citegate Pipeline
//!
//! Orchestrates one verification run over an AI-drafted motion and decides
//! the hard gate.
//!
//! # Overview
//!
//! A run takes the draft, the citation fragments extracted from it and the
//! research gathered before drafting. It normalizes the fragments, resolves
//! shorthand, looks every unique citation up in batches, checks quotations
//! and holdings, compiles flags and screens research results for adverse
//! authority. The draft may be delivered only when no citation carries a
//! critical flag.
//!
//! # Failure Handling
//!
//! - A failed or timed-out lookup sub-batch degrades only its own citations
//! - If every sub-batch fails, the run fails closed: gate shut, rate `ERROR`,
//!   holding-mismatch count -1
//! - A panic anywhere in the run also fails closed; `run` never panics or
//!   returns an error
//!
//! # Concurrency
//!
//! Collaborator calls are blocking and run on tokio's blocking pool, each
//! under its own deadline, with bounded fan-out. Each run owns its prefetch
//! map; only the session cost counter is shared.

#![warn(missing_docs)]

mod batch;
mod config;
mod context;
mod error;
mod metrics;
mod orchestrator;
mod services;
mod types;

pub use batch::{chunk_citations, BatchOutcome, TEXT_BLOCK_SEPARATOR};
pub use config::PipelineConfig;
pub use context::{LookupState, RunContext, SessionCost};
pub use error::PipelineError;
pub use metrics::RunMetrics;
pub use orchestrator::CitationPipeline;
pub use types::{
    AggregateSummary, CitationResearch, CitationResult, LookupOutcome, PipelineOutput,
    ResearchContext, VerificationRate, VerificationRequest,
};
