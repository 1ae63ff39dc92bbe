//! Content-hash de-duplication of cached results
//!
//! Structurally identical results stored under different literal keys
//! should resolve to one shared instance. The pool is a second, independent
//! `KeyedResultCache` keyed by a stable structural hash, decoupled from the
//! primary key cache so either can be tuned or disabled on its own.

use crate::entry::CacheSlot;
use crate::store::KeyedResultCache;
use reqcap_core::Clock;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Stable structural hash over attribute name/value pairs.
///
/// Pairs are sorted by name before hashing so insertion order never changes
/// the digest. Callers exclude the primary-attribute pseudo-key so identical
/// classification outputs share one instance across different client
/// identifier strings.
#[must_use]
pub fn content_hash<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut sorted: Vec<(&str, &str)> = pairs.into_iter().collect();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    for (name, value) in sorted {
        hasher.update((name.len() as u64).to_le_bytes());
        hasher.update(name.as_bytes());
        hasher.update((value.len() as u64).to_le_bytes());
        hasher.update(value.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Interning pool for evaluated results
#[derive(Debug)]
pub struct ResultPool<V> {
    cache: KeyedResultCache<V>,
    ttl: Duration,
}

impl<V> ResultPool<V> {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            cache: KeyedResultCache::new(clock),
            ttl,
        }
    }

    /// Return the pooled instance for `hash`, storing `candidate` if none
    /// exists yet. The returned `Arc` is shared by every caller that interned
    /// the same structural hash within the TTL window.
    pub fn intern(&self, hash: &str, candidate: Arc<V>) -> Arc<V> {
        if let Some(CacheSlot::Value(existing)) = self.cache.get(hash) {
            debug!(hash, "result de-duplicated from pool");
            return existing;
        }
        self.cache.put(hash.to_string(), candidate.clone(), self.ttl);
        candidate
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use reqcap_core::ManualClock;

    #[test]
    fn intern_returns_existing_instance_for_same_hash() {
        let pool: ResultPool<String> = ResultPool::new(
            Arc::new(ManualClock::default()),
            Duration::from_secs(60),
        );
        let first = Arc::new("result".to_string());
        let second = Arc::new("result".to_string());

        let a = pool.intern("h1", first.clone());
        let b = pool.intern("h1", second);
        assert!(Arc::ptr_eq(&a, &first));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn intern_distinct_hashes_stay_distinct() {
        let pool: ResultPool<String> = ResultPool::new(
            Arc::new(ManualClock::default()),
            Duration::from_secs(60),
        );
        let a = pool.intern("h1", Arc::new("a".to_string()));
        let b = pool.intern("h2", Arc::new("b".to_string()));
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn intern_after_expiry_stores_fresh_instance() {
        let clock = Arc::new(ManualClock::default());
        let pool: ResultPool<String> = ResultPool::new(clock.clone(), Duration::from_secs(10));

        let first = pool.intern("h1", Arc::new("a".to_string()));
        clock.advance(Duration::from_secs(10));
        let replacement = Arc::new("a".to_string());
        let second = pool.intern("h1", replacement.clone());

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &replacement));
    }

    #[test]
    fn content_hash_excludes_nothing_it_is_given() {
        let with_extra = content_hash([("mobile", "true"), ("tables", "yes")]);
        let without = content_hash([("mobile", "true")]);
        assert_ne!(with_extra, without);
    }

    #[test]
    fn content_hash_distinguishes_name_value_boundaries() {
        // ("ab","c") must not collide with ("a","bc")
        let left = content_hash([("ab", "c")]);
        let right = content_hash([("a", "bc")]);
        assert_ne!(left, right);
    }

    proptest! {
        #[test]
        fn content_hash_is_order_independent(
            pairs in proptest::collection::vec(("[a-z]{1,8}", "[a-zA-Z0-9]{0,12}"), 0..8),
        ) {
            let forward: Vec<(&str, &str)> =
                pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            let mut reversed = forward.clone();
            reversed.reverse();
            prop_assert_eq!(content_hash(forward), content_hash(reversed));
        }
    }
}
