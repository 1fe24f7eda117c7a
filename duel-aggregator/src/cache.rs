//! A keyed TTL cache with hit/miss counters (spec.md §3's "three
//! independent `{value, timestamp}` slots... with distinct TTLs").
//!
//! A single-value cache is just this keyed on `()`.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Hit/miss counters for one cache instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Lookups served from a fresh cached entry.
    pub hits: u64,
    /// Lookups that recomputed the value (missing or expired entry).
    pub misses: u64,
}

/// TTL-bounded cache keyed by `K`, storing `V` alongside its insertion
/// time. Entries older than `ttl` are treated as absent.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, V)>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Build an empty cache with the given time-to-live.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key` if fresh, otherwise run
    /// `compute` and cache its result. The lock is never held across
    /// `compute`'s await.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        {
            let entries = self.entries.lock().await;
            if let Some((inserted_at, value)) = entries.get(&key) {
                if inserted_at.elapsed() < self.ttl {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Ok(value.clone());
                }
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute().await?;
        self.entries.lock().await.insert(key, (Instant::now(), value.clone()));
        Ok(value)
    }

    /// Current hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drop every cached entry (shutdown). Counters are left intact.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}
