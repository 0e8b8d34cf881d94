//! Model-list cache boundary
//!
//! The host may persist catalog results between processes; this crate only
//! sees a get/put interface with a TTL. `InMemoryModelCache` backs tests
//! and hosts without persistent storage; `NoopModelCache` stands in when
//! caching is unavailable (the adapter then refetches per call).

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// External cache collaborator, keyed by provider-scoped strings.
///
/// Implementations are treated as idempotent and safe for concurrent
/// readers; expiry is owned by the cache, not the caller.
pub trait ModelCache: Send + Sync {
    /// Fetch a fresh (non-expired) entry, or `None`
    fn get(&self, key: &str) -> Option<Value>;
    /// Store an entry with a time-to-live
    fn put(&self, key: &str, value: Value, ttl: Duration);
}

/// Process-local cache with TTL expiry
#[derive(Default)]
pub struct InMemoryModelCache {
    entries: Mutex<HashMap<String, (Value, Instant)>>,
}

impl InMemoryModelCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelCache for InMemoryModelCache {
    fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some((value, deadline)) if Instant::now() < *deadline => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: &str, value: Value, ttl: Duration) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), (value, Instant::now() + ttl));
        }
    }
}

/// Cache that stores nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopModelCache;

impl ModelCache for NoopModelCache {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    fn put(&self, _key: &str, _value: Value, _ttl: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn in_memory_cache_round_trips_within_ttl() {
        let cache = InMemoryModelCache::new();
        cache.put("deepseek:models", json!(["a"]), Duration::from_secs(60));
        assert_eq!(cache.get("deepseek:models"), Some(json!(["a"])));
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = InMemoryModelCache::new();
        cache.put("deepseek:models", json!(["a"]), Duration::from_secs(0));
        assert_eq!(cache.get("deepseek:models"), None);
    }

    #[test]
    fn noop_cache_never_hits() {
        let cache = NoopModelCache;
        cache.put("k", json!(1), Duration::from_secs(60));
        assert_eq!(cache.get("k"), None);
    }
}
