//! Dependency visibility: for every root, the dependency entries through which
//! other units (or the owning unit itself) see that root.
//!
//! # Architecture
//!
//! ```text
//!  units ──► exported closure per target unit (memoized, BFS)
//!    │             │
//!    │             ▼
//!    ├──► dep_entries:  root ──► unit-dependency entries reaching it
//!    └──► lib entries:  root ──► library entries declaring it
//!                  │
//!                  ▼
//!  per root (rayon): library entries (scoped by library exclusions)
//!                    + unit-dependency entries of every enclosing root
//!                    + owning unit's source entry
//!                    ──► dedup by (owner, position), stable sort by owner name
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::model::{DependencyEntry, DependencyKind, Library, LibraryId, Unit, UnitId};
use crate::vfs::{FileId, FileTree, IgnorePolicy};

use super::catalog::RootCatalog;
use super::classifier::Classifier;
use super::hierarchy;

/// Root to ordered dependency entries.
pub(crate) type DependencyMap = HashMap<FileId, Arc<[DependencyEntry]>>;

type EntriesByRoot = HashMap<FileId, Vec<DependencyEntry>>;

/// Inputs of one visibility computation.
pub(crate) struct VisibilityInputs<'a> {
    pub tree: &'a dyn FileTree,
    pub ignore: &'a dyn IgnorePolicy,
    pub catalog: &'a RootCatalog,
    pub units: &'a [Unit],
    pub libraries: &'a HashMap<LibraryId, Library>,
    pub max_depth: usize,
}

struct EntryTables {
    dep_entries: EntriesByRoot,
    lib_class_entries: EntriesByRoot,
    lib_source_entries: EntriesByRoot,
}

/// Compute the full map for a generation.
pub(crate) fn compute(inputs: &VisibilityInputs<'_>) -> DependencyMap {
    let by_id: HashMap<UnitId, &Unit> = inputs.units.iter().map(|u| (u.id, u)).collect();
    let tables = entry_tables(inputs, &by_id);
    let names: HashMap<UnitId, &str> = inputs
        .units
        .iter()
        .map(|u| (u.id, u.name.as_str()))
        .collect();

    let map: DependencyMap = inputs
        .catalog
        .all_roots()
        .par_iter()
        .filter_map(|&root| {
            let h = hierarchy::walk(
                inputs.tree,
                inputs.ignore,
                inputs.catalog,
                root,
                inputs.max_depth,
            )?;
            let entries = entries_for_hierarchy(inputs, &by_id, &names, &tables, &h);
            if entries.is_empty() {
                None
            } else {
                Some((root, Arc::from(entries)))
            }
        })
        .collect();

    debug!(roots = map.len(), "Dependency visibility computed");
    map
}

fn entry_tables(inputs: &VisibilityInputs<'_>, by_id: &HashMap<UnitId, &Unit>) -> EntryTables {
    let mut closures: HashMap<UnitId, Arc<[FileId]>> = HashMap::new();
    let mut tables = EntryTables {
        dep_entries: HashMap::new(),
        lib_class_entries: HashMap::new(),
        lib_source_entries: HashMap::new(),
    };

    for unit in inputs.units {
        for entry in unit.dependencies() {
            match entry.kind {
                DependencyKind::Source => {}
                DependencyKind::Unit { target, .. } => {
                    if !by_id.contains_key(&target) {
                        debug!(unit = %unit.name, %target, "Dependency on unknown unit ignored");
                        continue;
                    }
                    let roots = closures
                        .entry(target)
                        .or_insert_with(|| exported_roots(target, by_id, inputs.libraries))
                        .clone();
                    for &root in roots.iter() {
                        tables.dep_entries.entry(root).or_default().push(*entry);
                    }
                }
                DependencyKind::Library { library, .. } => {
                    let Some(lib) = inputs.libraries.get(&library) else {
                        continue;
                    };
                    for &root in &lib.binary_roots {
                        tables.lib_class_entries.entry(root).or_default().push(*entry);
                    }
                    for &root in &lib.source_roots {
                        tables.lib_source_entries.entry(root).or_default().push(*entry);
                    }
                }
            }
        }
    }
    tables
}

/// Output and source roots of `target` plus everything it exports,
/// transitively. Circular unit graphs terminate on the visited set.
fn exported_roots(
    target: UnitId,
    by_id: &HashMap<UnitId, &Unit>,
    libraries: &HashMap<LibraryId, Library>,
) -> Arc<[FileId]> {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([target]);
    let mut binaries = Vec::new();
    let mut sources = Vec::new();

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        let Some(unit) = by_id.get(&id) else {
            continue;
        };
        binaries.extend(unit.output_roots.iter().copied());
        sources.extend(unit.folders().map(|f| f.file));

        for entry in unit.dependencies().iter().filter(|e| e.is_exported()) {
            match entry.kind {
                DependencyKind::Unit { target, .. } => queue.push_back(target),
                DependencyKind::Library { library, .. } => {
                    if let Some(lib) = libraries.get(&library) {
                        binaries.extend(lib.binary_roots.iter().copied());
                        sources.extend(lib.source_roots.iter().copied());
                    }
                }
                DependencyKind::Source => {}
            }
        }
    }

    let mut seen = HashSet::new();
    binaries
        .into_iter()
        .chain(sources)
        .filter(|r| seen.insert(*r))
        .collect()
}

fn entries_for_hierarchy(
    inputs: &VisibilityInputs<'_>,
    by_id: &HashMap<UnitId, &Unit>,
    names: &HashMap<UnitId, &str>,
    tables: &EntryTables,
    h: &[FileId],
) -> Vec<DependencyEntry> {
    let classifier = Classifier::new(inputs.tree, inputs.catalog);
    let module_root = classifier.module_root(h);
    let library_class_root = classifier.library_root(h, false);
    let library_source_root = classifier.library_root(h, true);

    let mut entries = library_entries(
        inputs.catalog,
        inputs.libraries,
        tables,
        h,
        library_class_root,
        library_source_root,
    );
    for root in h {
        if let Some(found) = tables.dep_entries.get(root) {
            entries.extend(found.iter().copied());
        }
    }
    if let Some(mcr) = module_root {
        if let Some(source) = module_source_entry(inputs.catalog, by_id, tables, h, mcr) {
            entries.push(source);
        }
    }

    let mut seen = HashSet::new();
    entries.retain(|e| seen.insert((e.owner, e.position)));
    entries.sort_by(|a, b| {
        let a = names.get(&a.owner).copied().unwrap_or_default();
        let b = names.get(&b.owner).copied().unwrap_or_default();
        a.cmp(b)
    });
    entries
}

fn library_entries(
    catalog: &RootCatalog,
    libraries: &HashMap<LibraryId, Library>,
    tables: &EntryTables,
    h: &[FileId],
    library_class_root: Option<FileId>,
    library_source_root: Option<FileId>,
) -> Vec<DependencyEntry> {
    let mut entries = Vec::new();
    let mut excluded_libraries: HashSet<LibraryId> = HashSet::new();
    let visible = |e: &&DependencyEntry, excluded: &HashSet<LibraryId>| {
        e.library()
            .filter(|l| libraries.contains_key(l))
            .map_or(true, |l| !excluded.contains(&l))
    };

    for &root in h {
        excluded_libraries.extend(catalog.excluding_libraries(root).iter().copied());

        if Some(root) == library_class_root && !catalog.is_source_root(root) {
            if let Some(found) = tables.lib_class_entries.get(&root) {
                entries.extend(found.iter().filter(|e| visible(e, &excluded_libraries)));
            }
        }
        if Some(root) == library_source_root && library_class_root.is_none() {
            if let Some(found) = tables.lib_source_entries.get(&root) {
                entries.extend(found.iter().filter(|e| visible(e, &excluded_libraries)));
            }
        }
        if tables.lib_class_entries.contains_key(&root)
            || (catalog.is_source_root(root) && library_source_root.is_none())
        {
            break;
        }
    }
    entries
}

fn module_source_entry(
    catalog: &RootCatalog,
    by_id: &HashMap<UnitId, &Unit>,
    tables: &EntryTables,
    h: &[FileId],
    module_root: FileId,
) -> Option<DependencyEntry> {
    let unit = catalog.content_root_of(module_root)?;
    for &root in h {
        if catalog.is_source_root_of(root, unit) {
            return by_id.get(&unit).and_then(|u| u.source_entry()).copied();
        }
        if tables.lib_class_entries.contains_key(&root) {
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentEntry, Scope, SourceKind};
    use crate::vfs::{IgnorePatterns, MemoryTree};

    fn visibility(
        tree: &MemoryTree,
        units: &[Unit],
        libraries: &[Library],
    ) -> (DependencyMap, HashMap<UnitId, Unit>) {
        let libraries: HashMap<_, _> = libraries.iter().map(|l| (l.id, l.clone())).collect();
        let catalog = RootCatalog::build(units, &libraries, &[], false);
        let ignore = IgnorePatterns::default();
        let map = compute(&VisibilityInputs {
            tree,
            ignore: &ignore,
            catalog: &catalog,
            units,
            libraries: &libraries,
            max_depth: 1000,
        });
        (map, units.iter().map(|u| (u.id, u.clone())).collect())
    }

    fn describe(entries: &[DependencyEntry], units: &HashMap<UnitId, Unit>) -> Vec<String> {
        entries
            .iter()
            .map(|e| format!("{}[{}]", units[&e.owner].name, e.position))
            .collect()
    }

    #[test]
    fn test_exported_closure_and_owner_order() {
        let mut tree = MemoryTree::new();
        let roots: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|n| {
                let content = tree.mkdirs(&format!("/ws/{}", n));
                let src = tree.mkdirs(&format!("/ws/{}/src", n));
                (content, src)
            })
            .collect();
        let unit = |id: u32, name: &str| {
            let (content, src) = roots[id as usize];
            Unit::new(UnitId(id), name)
                .with_content(ContentEntry::new(content).with_source(src, SourceKind::Production))
        };
        let a = unit(0, "a").with_unit_dependency(UnitId(1), false, Scope::Compile);
        let b = unit(1, "b").with_unit_dependency(UnitId(2), true, Scope::Compile);
        let c = unit(2, "c");

        let (map, units) = visibility(&tree, &[c, b, a], &[]);
        let c_src = roots[2].1;
        assert_eq!(describe(&map[&c_src], &units), vec!["a[1]", "b[1]", "c[0]"]);

        let a_src = roots[0].1;
        assert_eq!(describe(&map[&a_src], &units), vec!["a[0]"]);
    }

    #[test]
    fn test_non_exported_dependency_is_not_transitive() {
        let mut tree = MemoryTree::new();
        let b_src = tree.mkdirs("/ws/b/src");
        let c_src = tree.mkdirs("/ws/c/src");
        let a = Unit::new(UnitId(0), "a").with_unit_dependency(UnitId(1), false, Scope::Compile);
        let b = Unit::new(UnitId(1), "b")
            .with_content(ContentEntry::new(b_src).with_source(b_src, SourceKind::Production))
            .with_unit_dependency(UnitId(2), false, Scope::Compile);
        let c = Unit::new(UnitId(2), "c")
            .with_content(ContentEntry::new(c_src).with_source(c_src, SourceKind::Production));

        let (map, units) = visibility(&tree, &[a, b, c], &[]);
        assert_eq!(describe(&map[&c_src], &units), vec!["b[1]", "c[0]"]);
        assert_eq!(describe(&map[&b_src], &units), vec!["a[1]", "b[0]"]);
    }

    #[test]
    fn test_circular_units_terminate() {
        let mut tree = MemoryTree::new();
        let a_src = tree.mkdirs("/ws/a");
        let b_src = tree.mkdirs("/ws/b");
        let a = Unit::new(UnitId(0), "a")
            .with_content(ContentEntry::new(a_src).with_source(a_src, SourceKind::Production))
            .with_unit_dependency(UnitId(1), true, Scope::Compile);
        let b = Unit::new(UnitId(1), "b")
            .with_content(ContentEntry::new(b_src).with_source(b_src, SourceKind::Production))
            .with_unit_dependency(UnitId(0), true, Scope::Compile);

        let (map, units) = visibility(&tree, &[a, b], &[]);
        // each unit reaches itself back through the cycle
        assert_eq!(describe(&map[&a_src], &units), vec!["a[1]", "a[0]", "b[1]"]);
        assert_eq!(describe(&map[&b_src], &units), vec!["a[1]", "b[1]", "b[0]"]);
    }

    #[test]
    fn test_library_exclusion_scoping() {
        let mut tree = MemoryTree::new();
        let m = tree.mkdirs("/ws/m");
        let shared = tree.mkdirs("/repo/shared");
        let l1 = Library::new(LibraryId(1), "l1")
            .with_binary_root(shared)
            .with_excluded_root(shared);
        let l2 = Library::new(LibraryId(2), "l2").with_binary_root(shared);
        let unit = Unit::new(UnitId(0), "m")
            .with_content(ContentEntry::new(m))
            .with_library_dependency(LibraryId(1), false, Scope::Compile)
            .with_library_dependency(LibraryId(2), false, Scope::Compile);

        let (map, units) = visibility(&tree, &[unit], &[l1, l2]);
        assert_eq!(describe(&map[&shared], &units), vec!["m[2]"]);
        assert_eq!(map[&shared][0].library(), Some(LibraryId(2)));
    }

    #[test]
    fn test_library_source_without_classes() {
        let mut tree = MemoryTree::new();
        let m = tree.mkdirs("/ws/m");
        let sources = tree.mkdirs("/repo/lib-src");
        let lib = Library::new(LibraryId(0), "lib").with_source_root(sources);
        let unit = Unit::new(UnitId(0), "m")
            .with_content(ContentEntry::new(m))
            .with_library_dependency(LibraryId(0), true, Scope::Runtime);

        let (map, units) = visibility(&tree, &[unit], &[lib]);
        assert_eq!(describe(&map[&sources], &units), vec!["m[1]"]);
        assert!(!map.contains_key(&m), "plain content root has no source entry");
    }
}
