//! Per-directory classification cache.
//!
//! Root classifications are seeded once per generation and never change.
//! Any other directory inherits the record of its nearest classified
//! ancestor; the walk that finds it backfills every directory it passed so
//! later lookups anywhere on that path are a single map hit.
//!
//! # Architecture
//!
//! ```text
//! lookup(dir)
//!    │
//!    ├─ seeds (HashMap, immutable) ──hit──► record
//!    ├─ computed (DashMap)         ──hit──► record
//!    │
//!    └─ walk parents ─┬─ seeded/computed ancestor ─► its record
//!                     ├─ ignored ancestor ─────────► Ignored
//!                     └─ filesystem root ──────────► NotUnderProject
//!                              │
//!                              ▼
//!                   backfill visited dirs into `computed`
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::telemetry::IndexStats;
use crate::vfs::{FileId, FileTree, IgnorePolicy};

use super::hierarchy::possible_loop;
use super::info::DirectoryInfo;

/// Concurrent directory-to-record cache for one generation.
pub(crate) struct InfoCache {
    seeds: HashMap<FileId, Arc<DirectoryInfo>>,
    computed: DashMap<FileId, Arc<DirectoryInfo>>,
    ignored: Arc<DirectoryInfo>,
    not_under_project: Arc<DirectoryInfo>,
}

impl InfoCache {
    /// Cache pre-seeded with root classifications.
    pub fn new(seeds: HashMap<FileId, Arc<DirectoryInfo>>) -> Self {
        Self {
            seeds,
            computed: DashMap::new(),
            ignored: Arc::new(DirectoryInfo::ignored()),
            not_under_project: Arc::new(DirectoryInfo::not_under_project()),
        }
    }

    #[cfg(test)]
    pub fn seed_count(&self) -> usize {
        self.seeds.len()
    }

    #[cfg(test)]
    pub fn computed_count(&self) -> usize {
        self.computed.len()
    }

    pub fn ignored(&self) -> Arc<DirectoryInfo> {
        Arc::clone(&self.ignored)
    }

    pub fn not_under_project(&self) -> Arc<DirectoryInfo> {
        Arc::clone(&self.not_under_project)
    }

    fn cached(&self, file: FileId) -> Option<Arc<DirectoryInfo>> {
        self.seeds
            .get(&file)
            .cloned()
            .or_else(|| self.computed.get(&file).map(|e| Arc::clone(e.value())))
    }

    fn backfill(&self, visited: &[FileId], info: &Arc<DirectoryInfo>) {
        for &dir in visited {
            if !self.seeds.contains_key(&dir) {
                self.computed.insert(dir, Arc::clone(info));
            }
        }
    }

    /// Classification of a file or directory.
    ///
    /// Files take their parent's record unless the file itself is a seeded
    /// root or is ignored. Invalid handles classify as not under project.
    ///
    /// # Panics
    ///
    /// Panics when more than `max_depth` parent links are followed, which
    /// only happens if the tree's parent relation contains a cycle.
    pub fn lookup(
        &self,
        tree: &dyn FileTree,
        ignore: &dyn IgnorePolicy,
        file: FileId,
        max_depth: usize,
        stats: &IndexStats,
    ) -> Arc<DirectoryInfo> {
        if !tree.is_valid(file) {
            return self.not_under_project();
        }

        let start = if tree.is_directory(file) {
            file
        } else {
            if let Some(info) = self.cached(file) {
                stats.record_cache_hit();
                return info;
            }
            if ignore.is_ignored(tree, file) {
                return self.ignored();
            }
            match tree.parent(file) {
                Some(parent) => parent,
                None => return self.not_under_project(),
            }
        };

        if let Some(info) = self.cached(start) {
            stats.record_cache_hit();
            return info;
        }

        stats.record_cache_walk();
        let mut visited = Vec::new();
        let mut current = Some(start);
        while let Some(dir) = current {
            if visited.len() >= max_depth {
                possible_loop(tree, start, max_depth);
            }
            if let Some(info) = self.cached(dir) {
                self.backfill(&visited, &info);
                trace!(dir = %start, ancestor = %dir, steps = visited.len(), "Cache walk hit");
                return info;
            }
            visited.push(dir);
            if ignore.is_ignored(tree, dir) {
                let info = self.ignored();
                self.backfill(&visited, &info);
                return info;
            }
            current = tree.parent(dir);
        }

        let info = self.not_under_project();
        self.backfill(&visited, &info);
        info
    }
}
