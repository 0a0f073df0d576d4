//! Error types for pipeline runs

use thiserror::Error;

/// Conditions that abort a run
///
/// [`crate::CitationPipeline::run`] never returns these; it folds them into a
/// fail-closed [`crate::PipelineOutput`].
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration rejected before any work started
    #[error("Invalid pipeline configuration: {0}")]
    Config(String),

    /// Every lookup sub-batch failed; nothing was verified
    #[error("Authority lookup unavailable: {0}")]
    ServiceUnavailable(String),

    /// A worker task panicked
    #[error("Worker task panicked: {0}")]
    TaskPanicked(String),

    /// A worker task was cancelled or could not be joined
    #[error("Worker task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            PipelineError::TaskPanicked(err.to_string())
        } else {
            PipelineError::Join(err.to_string())
        }
    }
}
