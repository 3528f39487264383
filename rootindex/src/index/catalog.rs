//! Root catalog: every declared root and the tags attached to it.
//!
//! The catalog only collects. Precedence between overlapping roots is
//! resolved later, per hierarchy, by the classifier.
//!
//! # Parallel collection
//!
//! Units are scanned independently (optionally on the rayon pool) into
//! [`UnitRoots`] partials, which are then merged in unit order. Merging in
//! declaration order keeps "first registration wins" deterministic no matter
//! how the scan was scheduled.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::model::{
    ContentFolder, DependencyKind, Library, LibraryId, SourceKind, Unit, UnitId,
};
use crate::vfs::FileId;

/// One tag a root can carry. A root may carry several.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootTag {
    ContentRootOf(UnitId),
    ExcludedFromUnit(UnitId),
    SourceRootOf(UnitId, SourceKind),
    ExcludedFromWorkspace,
    LibraryBinaryRoot,
    LibrarySourceRoot,
    ExcludedFromLibrary(LibraryId),
}

/// Roots contributed by one library dependency entry.
#[derive(Debug, Clone)]
struct LibraryRoots {
    library: Option<LibraryId>,
    binaries: Vec<FileId>,
    sources: Vec<FileId>,
    excluded: Vec<FileId>,
}

/// Roots contributed by a single unit, before merging.
#[derive(Debug, Clone)]
pub(crate) struct UnitRoots {
    unit: UnitId,
    content_roots: Vec<FileId>,
    excluded: Vec<FileId>,
    folders: Vec<ContentFolder>,
    libraries: Vec<LibraryRoots>,
}

impl UnitRoots {
    fn collect(unit: &Unit, libraries: &HashMap<LibraryId, Library>) -> Self {
        let mut excluded: Vec<FileId> = unit.excluded_roots().collect();
        if unit.exclude_output {
            excluded.extend(unit.output_roots.iter().copied());
        }

        let libraries = unit
            .dependencies()
            .iter()
            .filter_map(|entry| match entry.kind {
                DependencyKind::Library { library, .. } => match libraries.get(&library) {
                    Some(lib) => Some(LibraryRoots {
                        library: Some(lib.id),
                        binaries: lib.binary_roots.clone(),
                        sources: lib.source_roots.clone(),
                        excluded: lib.excluded_roots.clone(),
                    }),
                    None => {
                        warn!(unit = %unit.name, %library, "Dependency on unknown library ignored");
                        None
                    }
                },
                _ => None,
            })
            .collect();

        Self {
            unit: unit.id,
            content_roots: unit.content_roots().collect(),
            excluded,
            folders: unit.folders().cloned().collect(),
            libraries,
        }
    }
}

/// Flat collections of every known root for one generation.
#[derive(Debug, Default, Clone)]
pub struct RootCatalog {
    class_and_source_roots: Vec<FileId>,
    class_and_source_set: HashSet<FileId>,
    library_sources: HashSet<FileId>,
    library_classes: HashSet<FileId>,
    content_root_of: HashMap<FileId, UnitId>,
    source_root_of: HashMap<FileId, Vec<UnitId>>,
    content_folders: HashMap<FileId, ContentFolder>,
    excluded_from_libraries: HashMap<FileId, Vec<LibraryId>>,
    class_of_libraries: HashMap<FileId, Vec<LibraryId>>,
    source_of_libraries: HashMap<FileId, Vec<LibraryId>>,
    excluded_from_workspace: HashSet<FileId>,
    excluded_from_unit: HashMap<FileId, UnitId>,
    namespace_seeds: HashMap<FileId, String>,
    all_roots: Vec<FileId>,
    all_root_set: HashSet<FileId>,
}

impl RootCatalog {
    /// Collect roots from units, the libraries they reference, and
    /// workspace-wide exclusions.
    pub fn build(
        units: &[Unit],
        libraries: &HashMap<LibraryId, Library>,
        workspace_excludes: &[FileId],
        parallel: bool,
    ) -> Self {
        let partials: Vec<UnitRoots> = if parallel {
            units
                .par_iter()
                .map(|u| UnitRoots::collect(u, libraries))
                .collect()
        } else {
            units
                .iter()
                .map(|u| UnitRoots::collect(u, libraries))
                .collect()
        };

        let mut catalog = Self::default();
        for partial in partials {
            catalog.merge(partial);
        }
        catalog
            .excluded_from_workspace
            .extend(workspace_excludes.iter().copied());
        catalog.finish();

        debug!(
            roots = catalog.all_roots.len(),
            content_roots = catalog.content_root_of.len(),
            source_roots = catalog.source_root_of.len(),
            library_roots = catalog.library_classes.len() + catalog.library_sources.len(),
            "Root catalog collected"
        );
        catalog
    }

    fn merge(&mut self, partial: UnitRoots) {
        let unit = partial.unit;

        for root in partial.content_roots {
            self.content_root_of.entry(root).or_insert(unit);
        }
        for root in partial.excluded {
            self.excluded_from_unit.entry(root).or_insert(unit);
        }
        for folder in partial.folders {
            let root = folder.file;
            self.add_class_or_source_root(root);
            let owners = self.source_root_of.entry(root).or_default();
            if !owners.contains(&unit) {
                owners.push(unit);
            }
            self.namespace_seeds
                .entry(root)
                .or_insert_with(|| folder.namespace_prefix.clone());
            self.content_folders.entry(root).or_insert(folder);
        }

        for lib in partial.libraries {
            for &root in &lib.sources {
                self.add_class_or_source_root(root);
                self.library_sources.insert(root);
                self.namespace_seeds.entry(root).or_default();
            }
            for &root in &lib.binaries {
                self.add_class_or_source_root(root);
                self.library_classes.insert(root);
                self.namespace_seeds.entry(root).or_default();
            }
            if let Some(id) = lib.library {
                for &root in &lib.excluded {
                    push_unique(self.excluded_from_libraries.entry(root).or_default(), id);
                }
                for &root in &lib.sources {
                    push_unique(self.source_of_libraries.entry(root).or_default(), id);
                }
                for &root in &lib.binaries {
                    push_unique(self.class_of_libraries.entry(root).or_default(), id);
                }
            }
        }
    }

    fn add_class_or_source_root(&mut self, root: FileId) {
        if self.class_and_source_set.insert(root) {
            self.class_and_source_roots.push(root);
        }
    }

    /// Assemble `all_roots` in a stable order: class/source roots first, then
    /// content roots, library exclusions, unit exclusions, workspace
    /// exclusions.
    fn finish(&mut self) {
        let mut content: Vec<_> = self.content_root_of.keys().copied().collect();
        let mut lib_excluded: Vec<_> = self.excluded_from_libraries.keys().copied().collect();
        let mut unit_excluded: Vec<_> = self.excluded_from_unit.keys().copied().collect();
        let mut workspace_excluded: Vec<_> = self.excluded_from_workspace.iter().copied().collect();
        content.sort();
        lib_excluded.sort();
        unit_excluded.sort();
        workspace_excluded.sort();

        let ordered = self
            .class_and_source_roots
            .clone()
            .into_iter()
            .chain(content)
            .chain(lib_excluded)
            .chain(unit_excluded)
            .chain(workspace_excluded);
        for root in ordered {
            if self.all_root_set.insert(root) {
                self.all_roots.push(root);
            }
        }
    }

    /// Every known root, each once.
    pub fn all_roots(&self) -> &[FileId] {
        &self.all_roots
    }

    pub fn is_root(&self, file: FileId) -> bool {
        self.all_root_set.contains(&file)
    }

    /// Source and library roots in first-declaration order.
    pub fn class_and_source_roots(&self) -> &[FileId] {
        &self.class_and_source_roots
    }

    pub fn content_root_of(&self, root: FileId) -> Option<UnitId> {
        self.content_root_of.get(&root).copied()
    }

    pub fn is_content_root(&self, root: FileId) -> bool {
        self.content_root_of.contains_key(&root)
    }

    pub fn excluded_from_unit(&self, root: FileId) -> Option<UnitId> {
        self.excluded_from_unit.get(&root).copied()
    }

    pub fn is_excluded_from_workspace(&self, root: FileId) -> bool {
        self.excluded_from_workspace.contains(&root)
    }

    /// Units declaring `root` as a source-like folder.
    pub fn source_root_units(&self, root: FileId) -> &[UnitId] {
        self.source_root_of
            .get(&root)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_source_root(&self, root: FileId) -> bool {
        self.source_root_of.contains_key(&root)
    }

    pub fn is_source_root_of(&self, root: FileId, unit: UnitId) -> bool {
        self.source_root_units(root).contains(&unit)
    }

    pub fn content_folder(&self, root: FileId) -> Option<&ContentFolder> {
        self.content_folders.get(&root)
    }

    pub fn is_library_source(&self, root: FileId) -> bool {
        self.library_sources.contains(&root)
    }

    pub fn is_library_class(&self, root: FileId) -> bool {
        self.library_classes.contains(&root)
    }

    /// Libraries declaring `root` as a binary root.
    pub fn class_libraries(&self, root: FileId) -> &[LibraryId] {
        self.class_of_libraries
            .get(&root)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Libraries declaring `root` as a source root.
    pub fn source_libraries(&self, root: FileId) -> &[LibraryId] {
        self.source_of_libraries
            .get(&root)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Libraries excluding `root`.
    pub fn excluding_libraries(&self, root: FileId) -> &[LibraryId] {
        self.excluded_from_libraries
            .get(&root)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Namespace prefix seeded on a source or library root.
    pub fn namespace_seed(&self, root: FileId) -> Option<&str> {
        self.namespace_seeds.get(&root).map(String::as_str)
    }

    /// Every tag carried by `root`.
    pub fn tags(&self, root: FileId) -> Vec<RootTag> {
        let mut tags = Vec::new();
        if let Some(unit) = self.content_root_of(root) {
            tags.push(RootTag::ContentRootOf(unit));
        }
        if let Some(unit) = self.excluded_from_unit(root) {
            tags.push(RootTag::ExcludedFromUnit(unit));
        }
        if let Some(folder) = self.content_folder(root) {
            for &unit in self.source_root_units(root) {
                tags.push(RootTag::SourceRootOf(unit, folder.kind));
            }
        }
        if self.is_excluded_from_workspace(root) {
            tags.push(RootTag::ExcludedFromWorkspace);
        }
        if self.is_library_class(root) {
            tags.push(RootTag::LibraryBinaryRoot);
        }
        if self.is_library_source(root) {
            tags.push(RootTag::LibrarySourceRoot);
        }
        for &library in self.excluding_libraries(root) {
            tags.push(RootTag::ExcludedFromLibrary(library));
        }
        tags
    }
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}
