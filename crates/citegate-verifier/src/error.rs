//! Verifier error types

use thiserror::Error;

/// Errors raised by authority and holding verifiers
#[derive(Error, Debug)]
pub enum VerifierError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Request exceeded its timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Upstream rate limit
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Credentials rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Response could not be read
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Fixture or configuration problem
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VerifierError {
    /// Whether retrying the same request could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            VerifierError::Communication(_) | VerifierError::Timeout(_) | VerifierError::RateLimitExceeded
        )
    }
}

impl From<reqwest::Error> for VerifierError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            VerifierError::Timeout(e.to_string())
        } else if e.is_decode() {
            VerifierError::InvalidResponse(e.to_string())
        } else {
            VerifierError::Communication(e.to_string())
        }
    }
}

impl From<serde_json::Error> for VerifierError {
    fn from(e: serde_json::Error) -> Self {
        VerifierError::InvalidResponse(e.to_string())
    }
}
