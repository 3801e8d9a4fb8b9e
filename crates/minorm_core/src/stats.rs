//! Manager statistics.
//!
//! Counters for the statements a manager issues and for cache traffic.
//!
//! # Usage
//!
//! ```rust,ignore
//! let before = manager.stats().snapshot();
//! manager.find_by_id::<Book>(id)?;
//! let after = manager.stats().snapshot();
//! assert_eq!(after.queries, before.queries); // served from cache
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Manager statistics.
///
/// All counters are atomic and monotonically increasing.
#[derive(Debug, Default)]
pub struct ManagerStats {
    /// SELECT statements, including schema introspection.
    queries: AtomicU64,
    /// INSERT statements.
    inserts: AtomicU64,
    /// UPDATE statements.
    updates: AtomicU64,
    /// DELETE statements.
    deletes: AtomicU64,
    /// CREATE / ALTER / DROP statements.
    ddl: AtomicU64,
    /// Lookups answered by the cache.
    cache_hits: AtomicU64,
    /// Lookups that went to the database.
    cache_misses: AtomicU64,
}

impl ManagerStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_ddl(&self) {
        self.ddl.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of SELECT statements issued.
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Returns the number of INSERT statements issued.
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Returns the number of UPDATE statements issued.
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    /// Returns the number of DELETE statements issued.
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Returns the number of DDL statements issued.
    pub fn ddl(&self) -> u64 {
        self.ddl.load(Ordering::Relaxed)
    }

    /// Returns the number of cache hits.
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Returns the number of cache misses.
    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all stats.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            queries: self.queries(),
            inserts: self.inserts(),
            updates: self.updates(),
            deletes: self.deletes(),
            ddl: self.ddl(),
            cache_hits: self.cache_hits(),
            cache_misses: self.cache_misses(),
        }
    }
}

/// A point-in-time snapshot of manager statistics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// SELECT statements issued.
    pub queries: u64,
    /// INSERT statements issued.
    pub inserts: u64,
    /// UPDATE statements issued.
    pub updates: u64,
    /// DELETE statements issued.
    pub deletes: u64,
    /// DDL statements issued.
    pub ddl: u64,
    /// Lookups answered by the cache.
    pub cache_hits: u64,
    /// Lookups that went to the database.
    pub cache_misses: u64,
}
