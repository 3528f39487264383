//! Index telemetry.
//!
//! Lock-free counters recording how queries are served, so callers can see
//! whether lookups hit the Info Cache or had to walk the tree, and how often
//! namespace queries are answered from memoized results.
//!
//! # Architecture
//!
//! ```text
//! Generation queries ─────► IndexStats ─────► StatsSnapshot ─────► Views
//!                          (atomic counters)  (point-in-time copy)  (CLI, logs)
//! ```
//!
//! # Example
//!
//! ```
//! use rootindex::telemetry::IndexStats;
//!
//! let stats = IndexStats::new();
//! stats.record_classify();
//! stats.record_cache_hit();
//!
//! let snapshot = stats.snapshot();
//! assert_eq!(snapshot.classify_calls, 1);
//! assert_eq!(snapshot.cache_hit_rate(), 1.0);
//! ```

mod metrics;
mod snapshot;

pub use metrics::IndexStats;
pub use snapshot::StatsSnapshot;
