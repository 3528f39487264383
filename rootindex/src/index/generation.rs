//! One immutable build of the root index.
//!
//! A generation is built from a snapshot of the providers and never changes
//! afterwards, apart from its internal memo caches. Readers hold an
//! `Arc<Generation>` for as long as they need a consistent view; a rebuild
//! creates a new generation rather than mutating this one.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::model::{DependencyEntry, Library, LibraryId, Unit, UnitId};
use crate::telemetry::IndexStats;
use crate::vfs::{FileId, FileTree, IgnorePolicy};

use super::cache::InfoCache;
use super::catalog::RootCatalog;
use super::classifier::{Classifier, RootClassification};
use super::hierarchy;
use super::info::DirectoryInfo;
use super::namespace::NamespaceIndex;
use super::root_index::IndexSources;
use super::visibility::{self, DependencyMap, VisibilityInputs};

/// Immutable snapshot of every index structure.
pub struct Generation {
    id: u64,
    tree: Arc<dyn FileTree>,
    ignore: Arc<dyn IgnorePolicy>,
    units: Vec<Unit>,
    unit_positions: HashMap<UnitId, usize>,
    libraries: HashMap<LibraryId, Library>,
    catalog: RootCatalog,
    pub(crate) cache: InfoCache,
    pub(crate) namespaces: NamespaceIndex,
    workspace_excluded: Vec<FileId>,
    order_entries: OnceLock<DependencyMap>,
    max_depth: usize,
    parallel: bool,
    stats: Arc<IndexStats>,
}

struct SeededRoot {
    root: FileId,
    classification: RootClassification,
    workspace_excluded: bool,
}

impl Generation {
    /// Build a generation from the current provider state.
    ///
    /// Fails only when a provider fails; nothing is published in that case.
    pub(crate) fn build(
        id: u64,
        sources: &IndexSources,
        config: &IndexConfig,
        stats: Arc<IndexStats>,
    ) -> Result<Self, IndexError> {
        let started = Instant::now();

        let units = dedup_units(sources.units.units()?);
        let libraries = dedup_libraries(sources.libraries.libraries()?);
        let mut workspace_excludes = Vec::new();
        for policy in &sources.excludes {
            workspace_excludes.extend(policy.excluded_roots()?);
        }

        let tree = Arc::clone(&sources.tree);
        let ignore = Arc::clone(&sources.ignore);
        let catalog = RootCatalog::build(
            &units,
            &libraries,
            &workspace_excludes,
            config.parallel_catalog,
        );

        let seeded = seed_roots(
            tree.as_ref(),
            ignore.as_ref(),
            &catalog,
            config.max_ancestor_depth,
            config.parallel_catalog,
        );

        let mut seeds = HashMap::with_capacity(seeded.len());
        let mut namespaces = NamespaceIndex::new();
        let mut workspace_excluded = Vec::new();
        for seed in seeded {
            if seed.workspace_excluded {
                workspace_excluded.push(seed.root);
            }
            namespaces.register(seed.root, seed.classification.namespace);
            seeds.insert(seed.root, Arc::new(seed.classification.info));
        }

        let unit_positions = units
            .iter()
            .enumerate()
            .map(|(i, u)| (u.id, i))
            .collect();

        info!(
            generation = id,
            units = units.len(),
            libraries = libraries.len(),
            roots = catalog.all_roots().len(),
            workspace_excluded = workspace_excluded.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Root index generation built"
        );

        Ok(Self {
            id,
            tree,
            ignore,
            units,
            unit_positions,
            libraries,
            catalog,
            cache: InfoCache::new(seeds),
            namespaces,
            workspace_excluded,
            order_entries: OnceLock::new(),
            max_depth: config.max_ancestor_depth,
            parallel: config.parallel_catalog,
            stats,
        })
    }

    /// Monotonic generation number.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn tree(&self) -> &dyn FileTree {
        self.tree.as_ref()
    }

    pub(crate) fn ignore_policy(&self) -> &dyn IgnorePolicy {
        self.ignore.as_ref()
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub(crate) fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Units in declaration order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.unit_positions.get(&id).map(|&i| &self.units[i])
    }

    pub fn library(&self, id: LibraryId) -> Option<&Library> {
        self.libraries.get(&id)
    }

    /// Every root with its tags.
    pub fn catalog(&self) -> &RootCatalog {
        &self.catalog
    }

    /// Excluded roots that lie under no content root.
    pub fn workspace_excluded_roots(&self) -> &[FileId] {
        &self.workspace_excluded
    }

    /// Root to dependency entries, computed on first use.
    pub(crate) fn dependency_map(&self) -> &DependencyMap {
        self.order_entries.get_or_init(|| {
            let started = Instant::now();
            let map = visibility::compute(&VisibilityInputs {
                tree: self.tree.as_ref(),
                ignore: self.ignore.as_ref(),
                catalog: &self.catalog,
                units: &self.units,
                libraries: &self.libraries,
                max_depth: self.max_depth,
            });
            info!(
                generation = self.id,
                roots = map.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Dependency visibility map built"
            );
            map
        })
    }

    /// Dependency entries registered for a root.
    pub(crate) fn entries_for_root(&self, root: FileId) -> &[DependencyEntry] {
        self.dependency_map()
            .get(&root)
            .map(|e| e.as_ref())
            .unwrap_or(&[])
    }

    /// Whether the visibility map has been computed yet.
    pub fn has_dependency_map(&self) -> bool {
        self.order_entries.get().is_some()
    }

    /// Verify that registered roots still refer to live tree entries.
    pub fn check_consistency(&self) -> Result<(), IndexError> {
        let mut stale: Vec<FileId> = self
            .workspace_excluded
            .iter()
            .copied()
            .chain(self.namespaces.registered_roots())
            .filter(|root| !self.tree.is_valid(*root))
            .collect();
        stale.sort();
        stale.dedup();

        if stale.is_empty() {
            return Ok(());
        }
        warn!(generation = self.id, stale = stale.len(), "Root index is inconsistent");
        Err(IndexError::Inconsistent {
            stale: stale.iter().map(|r| r.to_string()).collect(),
        })
    }

    /// Drop memoized negative namespace results.
    pub fn on_low_memory(&self) {
        self.namespaces.on_low_memory();
    }

    /// Whether root classification ran on the rayon pool.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generation")
            .field("id", &self.id)
            .field("units", &self.units.len())
            .field("libraries", &self.libraries.len())
            .field("roots", &self.catalog.all_roots().len())
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

fn seed_roots(
    tree: &dyn FileTree,
    ignore: &dyn IgnorePolicy,
    catalog: &RootCatalog,
    max_depth: usize,
    parallel: bool,
) -> Vec<SeededRoot> {
    let classifier = Classifier::new(tree, catalog);
    let classify_root = |&root: &FileId| {
        let hierarchy = hierarchy::walk(tree, ignore, catalog, root, max_depth);
        match hierarchy {
            Some(h) => SeededRoot {
                root,
                classification: classifier.classify(root, &h),
                workspace_excluded: (catalog.is_excluded_from_workspace(root)
                    || catalog.excluded_from_unit(root).is_some())
                    && classifier.nearest_content_root(&h).is_none(),
            },
            None => SeededRoot {
                root,
                classification: RootClassification {
                    info: DirectoryInfo::ignored(),
                    namespace: None,
                },
                workspace_excluded: false,
            },
        }
    };

    if parallel {
        catalog.all_roots().par_iter().map(classify_root).collect()
    } else {
        catalog.all_roots().iter().map(classify_root).collect()
    }
}

fn dedup_units(units: Vec<Unit>) -> Vec<Unit> {
    let mut seen = HashMap::new();
    let mut kept = Vec::with_capacity(units.len());
    for unit in units {
        if let Some(first) = seen.get(&unit.id) {
            warn!(unit = %unit.id, kept = %first, dropped = %unit.name, "Duplicate unit id");
            continue;
        }
        seen.insert(unit.id, unit.name.clone());
        kept.push(unit);
    }
    kept
}

fn dedup_libraries(libraries: Vec<Library>) -> HashMap<LibraryId, Library> {
    let mut kept = HashMap::with_capacity(libraries.len());
    for library in libraries {
        if kept.contains_key(&library.id) {
            warn!(library = %library.id, dropped = %library.name, "Duplicate library id");
            continue;
        }
        kept.insert(library.id, library);
    }
    kept
}
