//! Shared lookup cache
//!
//! Wraps a primary verifier and remembers found records across runs. Only
//! positive results are cached; a miss always falls through to a live
//! lookup, so results never depend on what happens to be cached.

use citegate_domain::traits::AuthorityVerifier;
use citegate_domain::{AuthorityRecord, BatchError, BatchLookup};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Read-mostly cache in front of an [`AuthorityVerifier`]
pub struct CachedAuthorityVerifier<V> {
    inner: V,
    cache: RwLock<HashMap<String, AuthorityRecord>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<V> CachedAuthorityVerifier<V> {
    /// Wrap `inner` with an empty cache
    pub fn new(inner: V) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Number of cached records
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached record
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// Citations answered from cache so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Citations sent to the wrapped verifier so far
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// The wrapped verifier
    pub fn inner(&self) -> &V {
        &self.inner
    }
}

impl<V> AuthorityVerifier for CachedAuthorityVerifier<V>
where
    V: AuthorityVerifier,
    V::Error: Display,
{
    type Error = V::Error;

    fn lookup_batch(&self, citations: &[String]) -> Result<BatchLookup, Self::Error> {
        let mut lookup = BatchLookup::default();
        let mut misses = Vec::new();

        // A poisoned lock only costs cache hits
        match self.cache.read() {
            Ok(cache) => {
                for citation in citations {
                    match cache.get(citation) {
                        Some(record) => {
                            lookup.results.insert(citation.clone(), record.clone());
                        }
                        None => misses.push(citation.clone()),
                    }
                }
            }
            Err(_) => misses.extend(citations.iter().cloned()),
        }

        self.hits.fetch_add(lookup.results.len(), Ordering::Relaxed);
        self.misses.fetch_add(misses.len(), Ordering::Relaxed);
        if misses.is_empty() {
            debug!("All {} citations served from cache", citations.len());
            return Ok(lookup);
        }

        match self.inner.lookup_batch(&misses) {
            Ok(live) => {
                if let Ok(mut cache) = self.cache.write() {
                    for (citation, record) in live.results.iter().filter(|(_, r)| r.found) {
                        cache.insert(citation.clone(), record.clone());
                    }
                }
                lookup.results.extend(live.results);
                lookup.errors.extend(live.errors);
                Ok(lookup)
            }
            Err(e) if !lookup.results.is_empty() => {
                warn!("Live lookup failed for {} uncached citations: {}", misses.len(), e);
                lookup.errors.push(BatchError {
                    text_block: misses.join("; "),
                    error: e.to_string(),
                    recoverable: true,
                });
                Ok(lookup)
            }
            Err(e) => Err(e),
        }
    }
}
