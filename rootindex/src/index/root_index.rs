//! Generation holder and rebuild control.
//!
//! [`RootIndex`] owns the provider handles and the current [`Generation`].
//! Readers take a cheap `Arc` snapshot; a rebuild constructs the next
//! generation off to the side and swaps the pointer only once it is complete.
//! A failed rebuild leaves the previous generation in place.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::model::{DependencyEntry, ExcludePolicy, LibraryProvider, UnitProvider};
use crate::telemetry::{IndexStats, StatsSnapshot};
use crate::vfs::{FileId, FileTree, IgnorePatterns, IgnorePolicy};

use super::generation::Generation;
use super::info::DirectoryInfo;

/// Collaborators a generation is built from.
#[derive(Clone)]
pub struct IndexSources {
    pub tree: Arc<dyn FileTree>,
    pub ignore: Arc<dyn IgnorePolicy>,
    pub units: Arc<dyn UnitProvider>,
    pub libraries: Arc<dyn LibraryProvider>,
    pub excludes: Vec<Arc<dyn ExcludePolicy>>,
}

impl IndexSources {
    /// Sources with the default ignore patterns and no workspace excludes.
    pub fn new(
        tree: Arc<dyn FileTree>,
        units: Arc<dyn UnitProvider>,
        libraries: Arc<dyn LibraryProvider>,
    ) -> Self {
        Self {
            tree,
            ignore: Arc::new(IgnorePatterns::default()),
            units,
            libraries,
            excludes: Vec::new(),
        }
    }

    pub fn with_ignore_policy(mut self, ignore: Arc<dyn IgnorePolicy>) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_exclude_policy(mut self, policy: Arc<dyn ExcludePolicy>) -> Self {
        self.excludes.push(policy);
        self
    }
}

/// What happened to a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEventKind {
    Created,
    Deleted,
    Moved,
    Renamed,
    ContentChanged,
}

/// A filesystem change reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsEvent {
    pub kind: FsEventKind,
    /// Affected entry; `None` when the host could not resolve it.
    pub file: Option<FileId>,
    pub is_directory: bool,
}

impl FsEvent {
    pub fn new(kind: FsEventKind, file: Option<FileId>, is_directory: bool) -> Self {
        Self {
            kind,
            file,
            is_directory,
        }
    }
}

/// Whether a batch of events can change any classification.
///
/// Events on plain files never do. Directory events and unresolved events
/// may move roots, so they require a new generation.
pub fn needs_rebuild(events: &[FsEvent]) -> bool {
    events.iter().any(|e| e.file.is_none() || e.is_directory)
}

/// Thread-safe root index with atomic generation swaps.
pub struct RootIndex {
    sources: RwLock<IndexSources>,
    config: IndexConfig,
    current: RwLock<Arc<Generation>>,
    rebuild_lock: Mutex<()>,
    next_generation: AtomicU64,
    stats: Arc<IndexStats>,
}

impl RootIndex {
    /// Build the first generation.
    pub fn new(sources: IndexSources, config: IndexConfig) -> Result<Self, IndexError> {
        let stats = Arc::new(IndexStats::new());
        let first = Generation::build(1, &sources, &config, Arc::clone(&stats))?;
        stats.record_rebuild();

        Ok(Self {
            sources: RwLock::new(sources),
            config,
            current: RwLock::new(Arc::new(first)),
            rebuild_lock: Mutex::new(()),
            next_generation: AtomicU64::new(2),
            stats,
        })
    }

    /// Snapshot of the current generation.
    pub fn current(&self) -> Arc<Generation> {
        self.current.read().clone()
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Build a new generation from the providers and publish it.
    ///
    /// On failure the previous generation keeps serving and the error is
    /// returned.
    pub fn rebuild(&self) -> Result<Arc<Generation>, IndexError> {
        let _serial = self.rebuild_lock.lock();
        let sources = self.sources.read().clone();
        let id = self.next_generation.fetch_add(1, Ordering::Relaxed);

        match Generation::build(id, &sources, &self.config, Arc::clone(&self.stats)) {
            Ok(generation) => {
                let generation = Arc::new(generation);
                let previous = {
                    let mut current = self.current.write();
                    std::mem::replace(&mut *current, Arc::clone(&generation))
                };
                self.stats.record_rebuild();
                info!(
                    generation = id,
                    previous = previous.id(),
                    "Root index generation published"
                );
                Ok(generation)
            }
            Err(e) => {
                self.stats.record_rebuild_failure();
                warn!(
                    generation = id,
                    error = %e,
                    serving = self.current.read().id(),
                    "Root index rebuild failed, keeping previous generation"
                );
                Err(e)
            }
        }
    }

    /// Swap in a new tree snapshot and rebuild.
    pub fn replace_tree(&self, tree: Arc<dyn FileTree>) -> Result<Arc<Generation>, IndexError> {
        self.sources.write().tree = tree;
        self.rebuild()
    }

    /// Rebuild if the events require it. Returns whether a rebuild happened.
    pub fn handle_events(&self, events: &[FsEvent]) -> Result<bool, IndexError> {
        if !needs_rebuild(events) {
            debug!(events = events.len(), "File events do not affect roots");
            return Ok(false);
        }
        self.rebuild()?;
        Ok(true)
    }

    /// Classification of a file or directory in the current generation.
    ///
    /// Each convenience query takes its own snapshot, so two calls may be
    /// answered by different generations if a rebuild lands in between.
    /// Callers combining several answers should pin one generation with
    /// [`current`](Self::current) and query it directly.
    pub fn classify(&self, file: FileId) -> Arc<DirectoryInfo> {
        self.current().classify(file)
    }

    /// Dependency entries through which `file` is visible.
    ///
    /// Takes a fresh snapshot; see [`classify`](Self::classify) for combining
    /// this with other queries.
    pub fn order_entries_for(&self, file: FileId) -> Vec<DependencyEntry> {
        self.current().order_entries_for(file).to_vec()
    }

    /// Directories carrying the namespace `ns`.
    pub fn directories_for_namespace(&self, ns: &str, include_library_sources: bool) -> Vec<FileId> {
        self.current()
            .directories_for_namespace(ns, include_library_sources)
            .collect()
    }

    /// Namespace of a directory.
    pub fn namespace_of(&self, dir: FileId) -> Option<String> {
        self.current().namespace_of(dir)
    }
}
