//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extraction output could not be read
    #[error("Extraction error: {0}")]
    Extractor(#[from] citegate_extractor::ExtractorError),

    /// Gatekeeper configuration was rejected
    #[error("Gatekeeper error: {0}")]
    Gatekeeper(#[from] citegate_gatekeeper::GatekeeperError),

    /// A collaborator could not be built
    #[error("Verifier error: {0}")]
    Verifier(#[from] citegate_verifier::VerifierError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
