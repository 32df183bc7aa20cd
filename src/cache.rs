use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Default lifetime of a cache entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// How often the background sweeper evicts expired entries.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    /// A zero TTL would expire the entry on arrival. Callers treat this as
    /// non-fatal and proceed as on a cache miss.
    #[error("invalid cache ttl: {0:?}")]
    InvalidTtl(Duration),
}

struct CacheEntry<V> {
    value: Arc<V>,
    expires_at: Instant,
}

/// Hit/miss counters, exposed for instrumentation only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// In-memory key-value cache with per-entry TTL.
///
/// Values are stored behind `Arc` and handed out as `Arc` clones, so a cached
/// value is shared by every reader. Treat cached values as immutable
/// snapshots.
///
/// Expired entries are dropped lazily on read and by the periodic sweeper
/// (see [`spawn_sweeper`]); both agree an expired entry is never returned.
pub struct TtlCache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    inner: Mutex<HashMap<K, CacheEntry<V>>>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Debug + Send + Sync,
    V: Send + Sync,
{
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            default_ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the value for `key` if present and unexpired.
    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        let mut cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                debug!("Cache HIT for key: {:?}", key);
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&entry.value))
            }
            Some(_) => {
                debug!("Cache entry expired for key: {:?}", key);
                cache.remove(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                debug!("Cache MISS for key: {:?}", key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores `value` under `key` with the default TTL, replacing any
    /// previous entry.
    pub async fn set(&self, key: K, value: Arc<V>) -> Result<(), CacheError> {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Stores `value` under `key`, expiring after `ttl`.
    pub async fn set_with_ttl(&self, key: K, value: Arc<V>, ttl: Duration) -> Result<(), CacheError> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl(ttl));
        }
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut cache = self.inner.lock().await;
        debug!("Cache SET for key: {:?} (ttl {:?})", key, ttl);
        cache.insert(key, entry);
        Ok(())
    }

    /// Removes `key`, returning the number of entries removed (0 or 1).
    pub async fn delete(&self, key: &K) -> usize {
        let mut cache = self.inner.lock().await;
        let removed = usize::from(cache.remove(key).is_some());
        debug!("Cache DELETE for key: {:?} removed {}", key, removed);
        removed
    }

    /// Evicts every entry unconditionally. Maintenance/debug paths only.
    pub async fn flush(&self) {
        let mut cache = self.inner.lock().await;
        debug!("Cache FLUSH ({} entries)", cache.len());
        cache.clear();
    }

    /// Drops all expired entries, returning how many were removed.
    pub async fn evict_expired(&self) -> usize {
        let mut cache = self.inner.lock().await;
        let before = cache.len();
        let now = Instant::now();
        cache.retain(|_, entry| entry.expires_at > now);
        before - cache.len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Starts the periodic expiry sweep for `cache`.
///
/// The task holds only a weak handle and exits once the cache is dropped.
pub fn spawn_sweeper<K, V>(cache: &Arc<TtlCache<K, V>>, interval: Duration) -> JoinHandle<()>
where
    K: Eq + Hash + Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    let weak: Weak<TtlCache<K, V>> = Arc::downgrade(cache);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(cache) = weak.upgrade() else { break };
            let evicted = cache.evict_expired().await;
            if evicted > 0 {
                debug!("Cache sweep evicted {} expired entries", evicted);
            }
        }
    })
}
