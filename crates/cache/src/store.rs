//! Concurrent keyed result cache with TTL expiry
//!
//! The map is the only shared mutable structure in the caching layer; all
//! access is a short critical section on one DashMap shard, with no I/O
//! inside the cache.

use crate::entry::{CacheEntry, CacheSlot};
use crate::stats::{CacheStats, StatsCounters};
use dashmap::DashMap;
use reqcap_core::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Thread-safe map from key to cached result or disable sentinel.
///
/// Writes are last-writer-wins: for a fixed key, every value ever written
/// must be semantically interchangeable (the computation is a pure function
/// of the attributes the key encodes), which makes racing duplicate
/// insertions an idempotent outcome rather than a correctness problem.
/// Entries are reclaimed only by TTL, checked lazily on read; expired
/// entries are treated as absent and removed when a read finds them.
#[derive(Debug)]
pub struct KeyedResultCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    clock: Arc<dyn Clock>,
    stats: StatsCounters,
}

impl<V> KeyedResultCache<V> {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            stats: StatsCounters::default(),
        }
    }

    /// Look up a live entry. Returns the slot (value or sentinel) if present
    /// and not expired; expired entries are removed and reported absent.
    pub fn get(&self, key: &str) -> Option<CacheSlot<V>> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired(now) {
                // Release the shard guard before removing
                drop(entry);
                self.entries.remove(key);
                self.stats.record_expiration();
                self.stats.record_miss();
                trace!(key, "cache entry expired");
                return None;
            }
            self.stats.record_hit();
            trace!(key, "cache hit");
            return Some(entry.slot.clone());
        }
        self.stats.record_miss();
        trace!(key, "cache miss");
        None
    }

    /// Insert or overwrite a value entry
    pub fn put(&self, key: impl Into<String>, value: Arc<V>, ttl: Duration) {
        let key = key.into();
        trace!(key = %key, "cache put");
        self.entries.insert(
            key,
            CacheEntry::new(CacheSlot::Value(value), self.clock.now(), ttl),
        );
        self.stats.record_insertion();
    }

    /// Insert or overwrite the disable sentinel
    pub fn put_sentinel(&self, key: impl Into<String>, ttl: Duration) {
        let key = key.into();
        trace!(key = %key, "cache put sentinel");
        self.entries.insert(
            key,
            CacheEntry::new(CacheSlot::DisableSentinel, self.clock.now(), ttl),
        );
        self.stats.record_insertion();
    }

    /// Explicitly drop an entry; idempotent
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Number of stored entries, live or not yet lazily expired
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqcap_core::ManualClock;
    use std::time::SystemTime;

    fn cache_with_clock() -> (KeyedResultCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (KeyedResultCache::new(clock.clone()), clock)
    }

    #[test]
    fn get_returns_absent_for_unknown_key() {
        let (cache, _clock) = cache_with_clock();
        assert!(cache.get("missing").is_none());
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn put_then_get_returns_same_instance() {
        let (cache, _clock) = cache_with_clock();
        let value = Arc::new("result".to_string());
        cache.put("k", value.clone(), Duration::from_secs(60));
        let slot = cache.get("k").expect("entry is live");
        let cached = slot.value().expect("slot holds a value");
        assert!(Arc::ptr_eq(cached, &value));
    }

    #[test]
    fn entry_present_before_ttl_absent_at_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.put("k", Arc::new("v".to_string()), Duration::from_secs(10));

        clock.advance(Duration::from_secs(9));
        assert!(cache.get("k").is_some());

        clock.advance(Duration::from_secs(1));
        assert!(cache.get("k").is_none());
        // Lazy expiry removed the entry
        assert!(cache.is_empty());
    }

    #[test]
    fn sentinel_round_trips_and_expires() {
        let (cache, clock) = cache_with_clock();
        cache.put_sentinel("k", Duration::from_secs(5));

        let slot = cache.get("k").expect("sentinel is live");
        assert!(slot.is_sentinel());
        assert!(slot.value().is_none());

        clock.advance(Duration::from_secs(5));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn put_overwrites_last_writer_wins() {
        let (cache, _clock) = cache_with_clock();
        cache.put("k", Arc::new("first".to_string()), Duration::from_secs(60));
        cache.put("k", Arc::new("second".to_string()), Duration::from_secs(60));

        let slot = cache.get("k").expect("entry is live");
        assert_eq!(
            slot.value().expect("slot holds a value").as_str(),
            "second"
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn sentinel_overwrites_value_and_vice_versa() {
        let (cache, _clock) = cache_with_clock();
        cache.put("k", Arc::new("v".to_string()), Duration::from_secs(60));
        cache.put_sentinel("k", Duration::from_secs(60));
        assert!(cache.get("k").expect("entry is live").is_sentinel());

        cache.put("k", Arc::new("v2".to_string()), Duration::from_secs(60));
        assert!(!cache.get("k").expect("entry is live").is_sentinel());
    }

    #[test]
    fn invalidate_is_idempotent() {
        let (cache, _clock) = cache_with_clock();
        cache.put("k", Arc::new("v".to_string()), Duration::from_secs(60));
        cache.invalidate("k");
        cache.invalidate("k");
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn clock_moving_backwards_expires_entry() {
        let clock = Arc::new(ManualClock::new(
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_000),
        ));
        let cache: KeyedResultCache<String> = KeyedResultCache::new(clock.clone());
        cache.put("k", Arc::new("v".to_string()), Duration::from_secs(60));

        clock.set(SystemTime::UNIX_EPOCH);
        assert!(cache.get("k").is_none());
    }
}
