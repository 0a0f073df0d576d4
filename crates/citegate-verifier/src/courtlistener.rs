//! CourtListener client
//!
//! Primary lookups go to the citation-lookup endpoint, which accepts a block
//! of text and returns one entry per citation it recognized. Secondary
//! lookups go to the opinion search endpoint, one citation at a time.
//!
//! # Examples
//!
//! ```no_run
//! use citegate_domain::traits::AuthorityVerifier;
//! use citegate_verifier::CourtListenerClient;
//!
//! let client = CourtListenerClient::new(
//!     citegate_verifier::courtlistener::DEFAULT_ENDPOINT,
//!     Some("token".to_string()),
//! )
//! .unwrap();
//! let lookup = client.lookup_batch(&["576 U.S. 644".to_string()]).unwrap();
//! ```

use crate::VerifierError;
use citegate_domain::traits::{AuthorityVerifier, SecondaryAuthoritySource};
use citegate_domain::{AuthorityRecord, BatchLookup};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Default API root
pub const DEFAULT_ENDPOINT: &str = "https://www.courtlistener.com/api/rest/v4";

/// Default per-request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Separator placed between citations in a lookup text block
const CITATION_SEPARATOR: &str = "; ";

/// One entry of the citation-lookup response
#[derive(Debug, Deserialize)]
struct LookupEntry {
    citation: String,
    #[serde(default)]
    normalized_citations: Vec<String>,
    status: u16,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    clusters: Vec<Cluster>,
}

#[derive(Debug, Deserialize)]
struct Cluster {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    case_name: Option<String>,
    #[serde(default)]
    date_filed: Option<String>,
    #[serde(default)]
    precedential_status: Option<String>,
    #[serde(default)]
    court_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    cluster_id: Option<u64>,
    #[serde(default, rename = "caseName")]
    case_name: Option<String>,
    #[serde(default)]
    court: Option<String>,
    #[serde(default, rename = "dateFiled")]
    date_filed: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Blocking CourtListener API client
///
/// Build and drop it outside an async context; the pipeline only calls it
/// from the blocking pool.
pub struct CourtListenerClient {
    endpoint: String,
    token: Option<String>,
    client: Client,
}

impl CourtListenerClient {
    /// Create a client with the default timeout
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Result<Self, VerifierError> {
        Self::with_timeout(endpoint, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom per-request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, VerifierError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VerifierError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Token {}", token)),
            None => request,
        }
    }

    /// Error for a non-success response
    fn status_error(status: StatusCode, body: String) -> VerifierError {
        match status {
            StatusCode::TOO_MANY_REQUESTS => VerifierError::RateLimitExceeded,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => VerifierError::Unauthorized(body),
            s => VerifierError::Communication(format!("HTTP {}: {}", s, body)),
        }
    }
}

fn citation_key(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn record_from_cluster(cluster: &Cluster) -> AuthorityRecord {
    AuthorityRecord {
        found: true,
        opinion_id: cluster.id.map(|id| id.to_string()),
        case_name: cluster.case_name.clone(),
        court: cluster.court_id.clone(),
        date_filed: cluster.date_filed.clone(),
        precedential_status: cluster.precedential_status.clone(),
        opinion_text: None,
    }
}

/// Map lookup entries back onto the submitted citation strings
fn map_entries(citations: &[String], entries: &[LookupEntry]) -> HashMap<String, AuthorityRecord> {
    let mut by_key: HashMap<String, &LookupEntry> = HashMap::new();
    for entry in entries {
        by_key.insert(citation_key(&entry.citation), entry);
        for normalized in &entry.normalized_citations {
            by_key.entry(citation_key(normalized)).or_insert(entry);
        }
    }

    let mut results = HashMap::new();
    for citation in citations {
        let Some(entry) = by_key.get(&citation_key(citation)) else {
            continue;
        };
        let record = match (entry.status, entry.clusters.first()) {
            (200, Some(cluster)) => record_from_cluster(cluster),
            (300, Some(cluster)) => {
                debug!("'{}' is ambiguous; using first of {} clusters", citation, entry.clusters.len());
                record_from_cluster(cluster)
            }
            _ => {
                if let Some(message) = &entry.error_message {
                    debug!("'{}' not found: {}", citation, message);
                }
                AuthorityRecord::not_found()
            }
        };
        results.insert(citation.clone(), record);
    }
    results
}

impl AuthorityVerifier for CourtListenerClient {
    type Error = VerifierError;

    fn lookup_batch(&self, citations: &[String]) -> Result<BatchLookup, Self::Error> {
        if citations.is_empty() {
            return Ok(BatchLookup::default());
        }

        let url = format!("{}/citation-lookup/", self.endpoint);
        let text = citations.join(CITATION_SEPARATOR);
        debug!("Looking up {} citations", citations.len());

        let response = self
            .authorize(self.client.post(&url))
            .form(&[("text", text.as_str())])
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Self::status_error(status, body));
        }

        let entries: Vec<LookupEntry> = response.json()?;
        let results = map_entries(citations, &entries);
        if results.len() < citations.len() {
            debug!(
                "{} of {} citations absent from lookup response",
                citations.len() - results.len(),
                citations.len()
            );
        }

        Ok(BatchLookup {
            results,
            errors: Vec::new(),
        })
    }
}

impl SecondaryAuthoritySource for CourtListenerClient {
    type Error = VerifierError;

    fn lookup(&self, citation: &str) -> Result<Option<AuthorityRecord>, Self::Error> {
        let url = format!("{}/search/", self.endpoint);
        let response = self
            .authorize(self.client.get(&url))
            .query(&[("type", "o"), ("citation", citation)])
            .send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Self::status_error(status, body));
        }

        let search: SearchResponse = response.json()?;
        if search.results.len() > 1 {
            warn!("Search for '{}' returned {} opinions; using the first", citation, search.results.len());
        }
        Ok(search.results.into_iter().next().map(|hit| AuthorityRecord {
            found: true,
            opinion_id: hit.cluster_id.map(|id| id.to_string()),
            case_name: hit.case_name,
            court: hit.court,
            date_filed: hit.date_filed,
            precedential_status: hit.status,
            opinion_text: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOKUP_RESPONSE: &str = r#"[
        {
            "citation": "576 U.S. 644",
            "normalized_citations": ["576 U.S. 644"],
            "start_index": 0,
            "end_index": 12,
            "status": 200,
            "error_message": "",
            "clusters": [
                {
                    "id": 2812209,
                    "case_name": "Obergefell v. Hodges",
                    "date_filed": "2015-06-26",
                    "precedential_status": "Published"
                }
            ]
        },
        {
            "citation": "1 F.4th 99999",
            "normalized_citations": ["1 F.4th 99999"],
            "status": 404,
            "error_message": "Citation not found: '1 F.4th 99999'",
            "clusters": []
        }
    ]"#;

    #[test]
    fn test_map_entries() {
        let entries: Vec<LookupEntry> = serde_json::from_str(LOOKUP_RESPONSE).unwrap();
        let citations = vec![
            "576 U. S. 644".to_string(),
            "1 F.4th 99999".to_string(),
            "9 F.3d 9".to_string(),
        ];
        let results = map_entries(&citations, &entries);

        let found = &results["576 U. S. 644"];
        assert!(found.found);
        assert_eq!(found.opinion_id.as_deref(), Some("2812209"));
        assert_eq!(found.case_name.as_deref(), Some("Obergefell v. Hodges"));

        assert!(!results["1 F.4th 99999"].found);
        assert!(!results.contains_key("9 F.3d 9"));
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = CourtListenerClient::new("https://example.test/api/", None).unwrap();
        assert_eq!(client.endpoint, "https://example.test/api");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            CourtListenerClient::status_error(StatusCode::TOO_MANY_REQUESTS, String::new()),
            VerifierError::RateLimitExceeded
        ));
        assert!(matches!(
            CourtListenerClient::status_error(StatusCode::UNAUTHORIZED, "bad token".to_string()),
            VerifierError::Unauthorized(body) if body == "bad token"
        ));
        match CourtListenerClient::status_error(StatusCode::BAD_GATEWAY, "upstream".to_string()) {
            VerifierError::Communication(msg) => {
                assert!(msg.contains("502"));
                assert!(msg.contains("upstream"));
            }
            other => panic!("expected communication error, got {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_endpoint_is_error() {
        let client = CourtListenerClient::with_timeout(
            "http://127.0.0.1:9",
            None,
            Duration::from_secs(2),
        )
        .unwrap();
        let result = client.lookup_batch(&["1 F.3d 2".to_string()]);
        assert!(result.is_err());
    }
}
