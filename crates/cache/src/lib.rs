//! Keyed result caching for reqcap
//!
//! This crate provides the shared cache layer used by the capabilities
//! evaluator:
//! - `KeyedResultCache`: a concurrent key → result map with per-entry TTL
//!   and an explicit disable-sentinel slot that suppresses an ineffective
//!   fast path.
//! - `ResultPool`: content-hash de-duplication so structurally identical
//!   results stored under different literal keys collapse to one instance.
//! - `CacheStats`: hit/miss accounting.
//!
//! Expiry is checked lazily on read; there is no background sweeper and no
//! capacity eviction (TTL is the only reclamation mechanism).

pub mod entry;
pub mod pool;
pub mod stats;
pub mod store;

pub use entry::CacheSlot;
pub use pool::{content_hash, ResultPool};
pub use stats::CacheStats;
pub use store::KeyedResultCache;
