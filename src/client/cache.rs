//! Time-bounded memo of the last response per request signature.
//!
//! Expiry is lazy: an expired entry stops being served as fresh but stays
//! stored so it can still back a rate-limit fallback.
//!
//! Every `clear` starts a new generation. A response fetched under an older
//! generation is handed to its callers but never stored.

use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Deterministic signature of (endpoint, parameter set)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Parameter order does not affect the key.
    pub fn new(endpoint: &str, params: &[(&str, String)]) -> Self {
        let normalized: BTreeMap<&str, &str> =
            params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let query = normalized
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        Self(format!("{}?{}", endpoint, query))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    stored_at: Instant,
}

/// Response cache shared by every consumer of the client
pub struct RequestCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
    generation: AtomicU64,
}

impl RequestCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            generation: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Payload if it is younger than the TTL.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            debug!(key = %key, "Cache hit");
            Some(entry.data.clone())
        } else {
            debug!(key = %key, "Cache entry expired");
            None
        }
    }

    /// Last stored payload regardless of age.
    pub fn get_stale(&self, key: &CacheKey) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    pub fn set(&self, key: CacheKey, data: Value) {
        self.entries.insert(
            key,
            CacheEntry {
                data,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Store `data` only if no `clear` happened since `generation` was read.
    pub fn set_if_current(&self, key: CacheKey, data: Value, generation: u64) -> bool {
        if self.generation() != generation {
            debug!(key = %key, "Dropping response from a cleared generation");
            return false;
        }
        self.set(key, data);
        true
    }

    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let dropped = self.entries.len();
        self.entries.clear();
        debug!(dropped, generation = self.generation(), "Cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_is_order_independent() {
        let a = CacheKey::new(
            "/soccer_epl/odds",
            &[("regions", "eu".to_string()), ("markets", "h2h".to_string())],
        );
        let b = CacheKey::new(
            "/soccer_epl/odds",
            &[("markets", "h2h".to_string()), ("regions", "eu".to_string())],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_distinguishes_endpoint_and_params() {
        let odds = CacheKey::new("/soccer_epl/odds", &[("markets", "h2h".to_string())]);
        let live = CacheKey::new("/soccer_epl/odds-live", &[("markets", "h2h".to_string())]);
        let uk = CacheKey::new("/soccer_epl/odds", &[("markets", "spreads".to_string())]);
        assert_ne!(odds, live);
        assert_ne!(odds, uk);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_but_stays_available_as_stale() {
        let cache = RequestCache::new(Duration::from_secs(30));
        let key = CacheKey::new("/", &[]);
        cache.set(key.clone(), json!([1, 2]));

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(cache.get(&key), Some(json!([1, 2])));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get(&key), None);
        assert_eq!(cache.get_stale(&key), Some(json!([1, 2])));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_refreshes_timestamp() {
        let cache = RequestCache::new(Duration::from_secs(30));
        let key = CacheKey::new("/", &[]);
        cache.set(key.clone(), json!("old"));
        tokio::time::advance(Duration::from_secs(31)).await;
        cache.set(key.clone(), json!("new"));
        assert_eq!(cache.get(&key), Some(json!("new")));
    }

    #[test]
    fn test_writes_from_before_clear_are_discarded() {
        let cache = RequestCache::new(Duration::from_secs(30));
        let key = CacheKey::new("/soccer_epl/odds", &[]);
        let before = cache.generation();

        cache.clear();
        assert!(!cache.set_if_current(key.clone(), json!("old identity"), before));
        assert!(cache.is_empty());

        assert!(cache.set_if_current(key.clone(), json!("current"), cache.generation()));
        assert_eq!(cache.get(&key), Some(json!("current")));
    }

    #[test]
    fn test_clear_drops_everything() {
        let cache = RequestCache::new(Duration::from_secs(30));
        cache.set(CacheKey::new("/a", &[]), json!(1));
        cache.set(CacheKey::new("/b", &[]), json!(2));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get_stale(&CacheKey::new("/a", &[])), None);
    }
}
