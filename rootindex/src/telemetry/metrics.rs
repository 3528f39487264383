//! Atomic counters for index activity.

use std::sync::atomic::{AtomicU64, Ordering};

use super::snapshot::StatsSnapshot;

/// Counters shared by every generation of one [`RootIndex`](crate::index::RootIndex).
///
/// All updates use relaxed atomics; values are advisory.
#[derive(Debug, Default)]
pub struct IndexStats {
    classify_calls: AtomicU64,
    cache_hits: AtomicU64,
    cache_walks: AtomicU64,
    namespace_hits: AtomicU64,
    namespace_misses: AtomicU64,
    namespace_negative_hits: AtomicU64,
    rebuilds: AtomicU64,
    rebuild_failures: AtomicU64,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_classify(&self) {
        self.classify_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// A lookup answered straight from the Info Cache.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A lookup that had to walk ancestors.
    pub fn record_cache_walk(&self) {
        self.cache_walks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_namespace_hit(&self) {
        self.namespace_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_namespace_miss(&self) {
        self.namespace_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_namespace_negative_hit(&self) {
        self.namespace_negative_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rebuild(&self) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rebuild_failure(&self) {
        self.rebuild_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            classify_calls: self.classify_calls.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_walks: self.cache_walks.load(Ordering::Relaxed),
            namespace_hits: self.namespace_hits.load(Ordering::Relaxed),
            namespace_misses: self.namespace_misses.load(Ordering::Relaxed),
            namespace_negative_hits: self.namespace_negative_hits.load(Ordering::Relaxed),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
            rebuild_failures: self.rebuild_failures.load(Ordering::Relaxed),
        }
    }
}
