//! Cache entry and slot types

use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// What a live cache key maps to
#[derive(Debug)]
pub enum CacheSlot<V> {
    /// A real cached result, shared by reference
    Value(Arc<V>),
    /// Marker meaning "do not trust the optimistic path for this key;
    /// always perform full evaluation"
    DisableSentinel,
}

impl<V> Clone for CacheSlot<V> {
    fn clone(&self) -> Self {
        match self {
            CacheSlot::Value(v) => CacheSlot::Value(Arc::clone(v)),
            CacheSlot::DisableSentinel => CacheSlot::DisableSentinel,
        }
    }
}

impl<V> CacheSlot<V> {
    /// Returns the cached value, or `None` for the sentinel
    #[must_use]
    pub fn value(&self) -> Option<&Arc<V>> {
        match self {
            CacheSlot::Value(v) => Some(v),
            CacheSlot::DisableSentinel => None,
        }
    }

    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        matches!(self, CacheSlot::DisableSentinel)
    }
}

/// In-memory cache entry with TTL bookkeeping
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    pub slot: CacheSlot<V>,
    pub inserted_at: SystemTime,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    pub fn new(slot: CacheSlot<V>, inserted_at: SystemTime, ttl: Duration) -> Self {
        Self {
            slot,
            inserted_at,
            ttl,
        }
    }

    /// An entry expires when `now - inserted_at >= ttl`; a clock that moved
    /// backwards is treated as expired
    pub fn is_expired(&self, now: SystemTime) -> bool {
        match now.duration_since(self.inserted_at) {
            Ok(elapsed) => elapsed >= self.ttl,
            Err(_) => true,
        }
    }
}
