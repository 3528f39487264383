//! Point-in-time copy of [`IndexStats`](super::IndexStats).

use std::fmt;

/// Counter values at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub classify_calls: u64,
    pub cache_hits: u64,
    pub cache_walks: u64,
    pub namespace_hits: u64,
    pub namespace_misses: u64,
    pub namespace_negative_hits: u64,
    pub rebuilds: u64,
    pub rebuild_failures: u64,
}

impl StatsSnapshot {
    /// Fraction of lookups served without walking, 0.0 to 1.0.
    ///
    /// Returns 1.0 when nothing has been looked up yet.
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_walks;
        if total == 0 {
            return 1.0;
        }
        self.cache_hits as f64 / total as f64
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "classify: {} ({} hits, {} walks, {:.1}% hit rate), namespaces: {} hits, {} misses, {} negative, rebuilds: {} ({} failed)",
            self.classify_calls,
            self.cache_hits,
            self.cache_walks,
            self.cache_hit_rate() * 100.0,
            self.namespace_hits,
            self.namespace_misses,
            self.namespace_negative_hits,
            self.rebuilds,
            self.rebuild_failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let snapshot = StatsSnapshot {
            cache_hits: 3,
            cache_walks: 1,
            ..Default::default()
        };
        assert!((snapshot.cache_hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_display_mentions_rebuilds() {
        let snapshot = StatsSnapshot {
            rebuilds: 2,
            rebuild_failures: 1,
            ..Default::default()
        };
        assert!(snapshot.to_string().contains("rebuilds: 2 (1 failed)"));
    }
}
