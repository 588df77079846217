use rustc_hash::FxHashMap;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Lifetime used by callers that have no better idea.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    /// `None` when the ttl reaches past what an `Instant` can represent.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// In-memory key/value store where every entry carries its own expiry.
///
/// Every operation runs under one lock over the whole map, so an expiry check
/// and the removal it triggers are never observed halfway. Expired entries are
/// only dropped when somebody reads them; there is no background sweeper.
#[derive(Debug)]
pub struct TtlCache<V = Map<String, Value>> {
    entries: Mutex<FxHashMap<String, CacheEntry<V>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(FxHashMap::default()),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        tracing::info!("Cache service initialised");
        Self::default()
    }

    /// Returns the value stored under `key` if it has not expired yet.
    ///
    /// An expired entry is removed as a side effect, so a stale value is never
    /// handed out.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let entry = entries.get(key)?;
        if entry.is_live(Instant::now()) {
            return Some(entry.value.clone());
        }
        tracing::debug!(key, "Cache entry expired, removing");
        entries.remove(key);
        None
    }

    /// Inserts or overwrites `key`. A zero `ttl` makes the entry expired on
    /// its next read; a ttl too large to add to the clock never expires.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now().checked_add(ttl),
        };
        self.entries.lock().await.insert(key.into(), entry);
    }

    pub async fn set_default(&self, key: impl Into<String>, value: V) {
        self.set(key, value, DEFAULT_TTL).await
    }

    /// Removes `key` if present. Absent keys are ignored.
    pub async fn invalidate(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    /// Number of stored entries, expired-but-unread ones included.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
