//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur while reading extraction output
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The extraction tool reported a failure
    #[error("Extraction tool error: {0}")]
    Tool(String),

    /// Extraction output is not valid JSON for the expected schema
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// Extraction output is well-formed but inconsistent
    #[error("Invalid extraction output: {0}")]
    InvalidFormat(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
