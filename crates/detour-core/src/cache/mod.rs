//! Bounded in-memory response cache.
//!
//! Keyed by a BLAKE3 request digest (see [`crate::hashing::hash_request`]).
//! Scoring is deterministic for a loaded model version and the catalog is
//! immutable, so a cached outcome stays valid for the process lifetime.

use moka::sync::Cache;

/// LRU cache over request digests. Capacity `0` disables caching
/// entirely; lookups then always miss and inserts are dropped.
pub struct ResponseCache<V: Clone + Send + Sync + 'static> {
    entries: Option<Cache<[u8; 32], V>>,
}

impl<V: Clone + Send + Sync + 'static> std::fmt::Debug for ResponseCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("enabled", &self.entries.is_some())
            .finish()
    }
}

impl<V: Clone + Send + Sync + 'static> ResponseCache<V> {
    /// Creates a cache with a max entry capacity (LRU eviction).
    pub fn with_capacity(capacity: u64) -> Self {
        let entries =
            (capacity > 0).then(|| Cache::builder().max_capacity(capacity).build());
        Self { entries }
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    pub fn lookup(&self, hash: &[u8; 32]) -> Option<V> {
        self.entries.as_ref()?.get(hash)
    }

    pub fn insert(&self, hash: [u8; 32], value: V) {
        if let Some(entries) = &self.entries {
            entries.insert(hash, value);
        }
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> u64 {
        self.entries
            .as_ref()
            .map(|entries| {
                entries.run_pending_tasks();
                entries.entry_count()
            })
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
