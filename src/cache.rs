//! Session-scoped memoization of places-provider results.
//!
//! Keys are structural fingerprints: two keys compare equal iff all fields
//! are equal, never by identity. Concurrent callers with equal keys share a
//! single in-flight fetch, so each distinct key hits the external provider
//! at most once per cache lifetime. A failed fetch propagates its error and
//! leaves the entry unpopulated; the next caller retries.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use crate::error::Result;
use crate::types::CandidatePlace;

/// Structural fingerprint of one provider request.
///
/// Coordinates are quantized to microdegrees (about 0.1 m) so that equality
/// and hashing are exact; categories are sorted so the key does not depend
/// on argument order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Nearby {
        lat_e6: i64,
        lng_e6: i64,
        radius_m: u32,
        categories: Vec<String>,
    },
    Text {
        query: String,
    },
    Details {
        place_id: String,
    },
}

impl CacheKey {
    pub fn nearby(lat: f64, lng: f64, radius_m: u32, categories: &[String]) -> Self {
        let mut categories = categories.to_vec();
        categories.sort();
        Self::Nearby {
            lat_e6: (lat * 1e6).round() as i64,
            lng_e6: (lng * 1e6).round() as i64,
            radius_m,
            categories,
        }
    }

    pub fn text(query: impl Into<String>) -> Self {
        Self::Text {
            query: query.into(),
        }
    }

    pub fn details(place_id: impl Into<String>) -> Self {
        Self::Details {
            place_id: place_id.into(),
        }
    }
}

/// Map of keys to at-most-once-initialized values. The mutex guards only
/// the map itself; fetches run outside it, coordinated per key by the
/// `OnceCell`.
#[derive(Debug)]
struct SingleFlight<V: Clone> {
    entries: Mutex<HashMap<CacheKey, Arc<OnceCell<V>>>>,
}

impl<V: Clone> SingleFlight<V> {
    fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let cell = {
            let mut entries = self.entries.lock().expect("cache mutex poisoned");
            Arc::clone(entries.entry(key).or_default())
        };
        cell.get_or_try_init(fetch).await.map(V::clone)
    }

    fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }
}

/// Memoizes nearby-search and place-resolution results for one session.
///
/// Append-only for its lifetime: there is no invalidation or TTL. Staleness
/// within a single planning session is accepted in exchange for never
/// issuing duplicate provider calls.
#[derive(Debug)]
pub struct CandidateCache {
    searches: SingleFlight<Vec<CandidatePlace>>,
    lookups: SingleFlight<CandidatePlace>,
}

impl CandidateCache {
    pub fn new() -> Self {
        Self {
            searches: SingleFlight::new(),
            lookups: SingleFlight::new(),
        }
    }

    /// Memoized nearby search; `fetch` runs at most once per distinct key.
    pub async fn nearby_search<F, Fut>(&self, key: CacheKey, fetch: F) -> Result<Vec<CandidatePlace>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<CandidatePlace>>>,
    {
        self.searches.get_or_fetch(key, fetch).await
    }

    /// Memoized single-place resolution (text search or details).
    pub async fn resolve<F, Fut>(&self, key: CacheKey, fetch: F) -> Result<CandidatePlace>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CandidatePlace>>,
    {
        self.lookups.get_or_fetch(key, fetch).await
    }

    /// Number of populated or in-flight entries, for diagnostics.
    pub fn entry_count(&self) -> usize {
        self.searches.len() + self.lookups.len()
    }
}

impl Default for CandidateCache {
    fn default() -> Self {
        Self::new()
    }
}
