//! Ollama-backed holding verifier
//!
//! Asks a local model whether an opinion supports a proposition and reads
//! back one of EXACT, CONSISTENT, MISMATCH or UNVERIFIABLE.
//!
//! # Examples
//!
//! ```no_run
//! use citegate_domain::traits::HoldingVerifier;
//! use citegate_verifier::OllamaHoldingVerifier;
//!
//! let verifier = OllamaHoldingVerifier::new("http://localhost:11434", "llama3").unwrap();
//! let verdict = verifier
//!     .verify_holding("1 F.3d 2", "Covenants are enforceable", "We hold ...")
//!     .unwrap();
//! ```

use crate::VerifierError;
use citegate_domain::traits::HoldingVerifier;
use citegate_domain::HoldingVerdict;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for a verification request (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Opinion text beyond this many characters is cut from the prompt
pub const MAX_OPINION_CHARS: usize = 12_000;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Holding verifier backed by an Ollama model
pub struct OllamaHoldingVerifier {
    endpoint: String,
    model: String,
    client: Client,
    max_retries: u32,
}

impl OllamaHoldingVerifier {
    /// Create a verifier for `model` at `endpoint`
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, VerifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| VerifierError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    fn generate(&self, prompt: String) -> Result<String, VerifierError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let mut last_error = None;
        for attempt in 0..self.max_retries {
            if attempt > 0 {
                // 1s, 2s, 4s, ...
                std::thread::sleep(Duration::from_secs(1 << (attempt - 1)));
            }
            match self.client.post(&url).json(&body).send() {
                Ok(response) if response.status().is_success() => {
                    let parsed: GenerateResponse = response.json()?;
                    return Ok(parsed.response);
                }
                Ok(response) if response.status() == StatusCode::NOT_FOUND => {
                    return Err(VerifierError::Config(format!("Model not available: {}", self.model)));
                }
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().unwrap_or_default();
                    last_error = Some(VerifierError::Communication(format!("HTTP {}: {}", status, text)));
                }
                Err(e) => last_error = Some(e.into()),
            }
            debug!("Holding verification attempt {} failed", attempt + 1);
        }

        Err(last_error.unwrap_or_else(|| VerifierError::Communication("Max retries exceeded".to_string())))
    }
}

fn build_prompt(citation: &str, proposition: &str, opinion_text: &str) -> String {
    let excerpt: String = opinion_text.chars().take(MAX_OPINION_CHARS).collect();
    format!(
        "You are checking a legal brief. The brief cites {citation} for this proposition:\n\
         \"{proposition}\"\n\n\
         Opinion text:\n{excerpt}\n\n\
         Answer with exactly one word:\n\
         EXACT if the opinion states the proposition,\n\
         CONSISTENT if the opinion supports it,\n\
         MISMATCH if the opinion does not support it or holds otherwise,\n\
         UNVERIFIABLE if the text is insufficient to decide."
    )
}

/// First verdict keyword in a model response
fn parse_verdict(response: &str) -> HoldingVerdict {
    let upper = response.to_ascii_uppercase();
    upper
        .split(|c: char| !c.is_ascii_alphabetic())
        .find_map(|word| match word {
            "EXACT" | "CONSISTENT" | "MISMATCH" | "UNVERIFIABLE" => Some(HoldingVerdict::parse(word)),
            _ => None,
        })
        .unwrap_or_else(|| {
            warn!("No verdict keyword in model response; treating as UNVERIFIABLE");
            HoldingVerdict::Unverifiable
        })
}

impl HoldingVerifier for OllamaHoldingVerifier {
    type Error = VerifierError;

    fn verify_holding(
        &self,
        citation: &str,
        proposition: &str,
        opinion_text: &str,
    ) -> Result<HoldingVerdict, Self::Error> {
        let response = self.generate(build_prompt(citation, proposition, opinion_text))?;
        Ok(parse_verdict(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_creation() {
        let verifier = OllamaHoldingVerifier::new("http://localhost:11434/", "llama3").unwrap();
        assert_eq!(verifier.endpoint, "http://localhost:11434");
        assert_eq!(verifier.model, "llama3");
        assert_eq!(verifier.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(verifier.with_max_retries(0).max_retries, 1);
    }

    #[test]
    fn test_parse_verdict() {
        assert_eq!(parse_verdict("CONSISTENT"), HoldingVerdict::Consistent);
        assert_eq!(parse_verdict("Verdict: mismatch."), HoldingVerdict::Mismatch);
        assert_eq!(parse_verdict("exact\n"), HoldingVerdict::Exact);
        assert_eq!(parse_verdict("I cannot tell."), HoldingVerdict::Unverifiable);
    }

    #[test]
    fn test_prompt_truncates_opinion() {
        let opinion = "x".repeat(MAX_OPINION_CHARS + 500);
        let prompt = build_prompt("1 F.3d 2", "p", &opinion);
        assert!(prompt.len() < MAX_OPINION_CHARS + 1000);
        assert!(prompt.contains("1 F.3d 2"));
    }

    #[test]
    fn test_unreachable_endpoint_is_communication_error() {
        let verifier = OllamaHoldingVerifier::new("http://127.0.0.1:9", "llama3")
            .unwrap()
            .with_max_retries(1);
        let result = verifier.verify_holding("1 F.3d 2", "p", "t");
        assert!(matches!(result, Err(VerifierError::Communication(_))));
    }
}
