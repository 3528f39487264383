//! Read-side queries on a [`Generation`].

use std::collections::HashSet;
use std::sync::Arc;

use crate::model::{DependencyEntry, SourceKind, UnitId};
use crate::vfs::FileId;

use super::generation::Generation;
use super::info::DirectoryInfo;

impl Generation {
    /// Classification of a file or directory.
    ///
    /// Never fails: paths outside every root classify as not under project,
    /// and invalid handles do too.
    ///
    /// # Panics
    ///
    /// Panics if the tree's parent relation contains a cycle.
    pub fn classify(&self, file: FileId) -> Arc<DirectoryInfo> {
        self.stats().record_classify();
        self.cache.lookup(
            self.tree(),
            self.ignore_policy(),
            file,
            self.max_depth(),
            self.stats(),
        )
    }

    /// Dependency entries through which `file` is visible, ordered by owner
    /// unit name.
    pub fn order_entries_for(&self, file: FileId) -> &[DependencyEntry] {
        match self.classify(file).root() {
            Some(root) => self.entries_for_root(root),
            None => &[],
        }
    }

    /// Directories whose namespace is exactly `ns`.
    ///
    /// Without library sources, directories that are only library sources
    /// (not also unit sources or library binaries) are left out.
    pub fn directories_for_namespace(
        &self,
        ns: &str,
        include_library_sources: bool,
    ) -> impl Iterator<Item = FileId> + '_ {
        let dirs = self.namespaces.directories(self, ns);
        (0..dirs.len()).map(move |i| dirs[i]).filter(move |&dir| {
            if include_library_sources {
                return true;
            }
            let info = self.classify(dir);
            info.is_in_project()
                && (!info.is_in_library_source()
                    || info.is_in_module_source()
                    || info.has_library_class_root())
        })
    }

    /// Dotted namespace of a directory, if it lies under a namespace root.
    pub fn namespace_of(&self, dir: FileId) -> Option<String> {
        self.namespaces
            .namespace_of(self.tree(), self.ignore_policy(), dir, self.max_depth())
    }

    /// Whether the path belongs to some unit's content.
    pub fn is_in_content(&self, file: FileId) -> bool {
        let info = self.classify(file);
        info.is_in_project() && info.owning_unit().is_some()
    }

    /// Whether the path is inside a unit's source-like folder.
    pub fn is_in_source_content(&self, file: FileId) -> bool {
        self.classify(file).is_in_module_source()
    }

    pub fn is_in_test_source_content(&self, file: FileId) -> bool {
        self.classify(file).is_in_test_source()
    }

    pub fn is_in_library_classes(&self, file: FileId) -> bool {
        let info = self.classify(file);
        info.is_in_project() && info.has_library_class_root()
    }

    pub fn is_in_library_source(&self, file: FileId) -> bool {
        let info = self.classify(file);
        info.is_in_project() && info.is_in_library_source()
    }

    pub fn is_excluded(&self, file: FileId) -> bool {
        self.classify(file).is_excluded()
    }

    pub fn is_ignored(&self, file: FileId) -> bool {
        self.classify(file).is_ignored()
    }

    /// Unit owning the path.
    pub fn unit_for(&self, file: FileId) -> Option<UnitId> {
        let info = self.classify(file);
        if info.is_in_project() {
            info.owning_unit()
        } else {
            None
        }
    }

    pub fn content_root_for(&self, file: FileId) -> Option<FileId> {
        let info = self.classify(file);
        if info.is_in_project() {
            info.nearest_content_root()
        } else {
            None
        }
    }

    pub fn source_root_for(&self, file: FileId) -> Option<FileId> {
        let info = self.classify(file);
        if info.is_in_project() {
            info.nearest_source_root()
        } else {
            None
        }
    }

    pub fn class_root_for(&self, file: FileId) -> Option<FileId> {
        let info = self.classify(file);
        if info.is_in_project() {
            info.library_class_root()
        } else {
            None
        }
    }

    pub fn source_kind_for(&self, file: FileId) -> Option<SourceKind> {
        let info = self.classify(file);
        if info.is_in_module_source() {
            info.source_kind()
        } else {
            None
        }
    }

    /// Visit every indexed entry under every unit's content roots.
    ///
    /// Excluded and ignored directories are skipped together with their
    /// subtrees. A content root nested in content of the same unit is not
    /// walked twice. `filter` decides which entries reach the visitor; it
    /// does not prune traversal. Returns `false` if the visitor stopped the
    /// iteration.
    pub fn iterate_content<V>(&self, mut visitor: V, filter: Option<&dyn Fn(FileId) -> bool>) -> bool
    where
        V: FnMut(FileId) -> bool,
    {
        for root in self.content_iteration_roots() {
            if !self.iterate_content_under(root, &mut visitor, filter) {
                return false;
            }
        }
        true
    }

    /// Visit every indexed entry under `dir`, depth first.
    pub fn iterate_content_under<V>(
        &self,
        dir: FileId,
        mut visitor: V,
        filter: Option<&dyn Fn(FileId) -> bool>,
    ) -> bool
    where
        V: FnMut(FileId) -> bool,
    {
        let tree = self.tree();
        let mut stack = vec![dir];
        while let Some(file) = stack.pop() {
            let info = self.classify(file);
            if info.is_excluded() || info.is_ignored() {
                continue;
            }
            if filter.map_or(true, |accept| accept(file)) && !visitor(file) {
                return false;
            }
            if tree.is_directory(file) {
                stack.extend(tree.children(file).iter().rev().copied());
            }
        }
        true
    }

    fn content_iteration_roots(&self) -> Vec<FileId> {
        let tree = self.tree();
        let mut seen = HashSet::new();
        let mut roots = Vec::new();

        for unit in self.units() {
            for root in unit.content_roots() {
                if self.classify(root).owning_unit() != Some(unit.id) {
                    continue;
                }
                let nested = tree.parent(root).is_some_and(|parent| {
                    let info = self.classify(parent);
                    info.is_in_project() && info.owning_unit() == Some(unit.id)
                });
                if !nested && seen.insert(root) {
                    roots.push(root);
                }
            }
        }
        roots
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::IndexConfig;
    use crate::index::IndexSources;
    use crate::model::{ContentEntry, ContentFolder, Library, LibraryId, Scope, Unit, WorkspaceModel};
    use crate::telemetry::IndexStats;
    use crate::vfs::{FileTree, MemoryTree};

    fn generation(tree: MemoryTree, units: Vec<Unit>, libraries: Vec<Library>) -> Generation {
        let model = Arc::new(WorkspaceModel::with_declarations(units, libraries));
        let sources = IndexSources::new(Arc::new(tree), model.clone(), model);
        Generation::build(1, &sources, &IndexConfig::default(), Arc::new(IndexStats::new()))
            .unwrap()
    }

    /// Unit `M`: content `/proj/m`, production source `/proj/m/src`,
    /// excluded `/proj/m/build`.
    fn scenario() -> (Generation, MemoryTree) {
        let mut tree = MemoryTree::new();
        let m = tree.mkdirs("/proj/m");
        let src = tree.mkdirs("/proj/m/src");
        let build = tree.mkdirs("/proj/m/build");
        tree.touch("/proj/m/build/x");
        tree.touch("/proj/m/src/pkg/Foo");
        tree.touch("/proj/m/README");
        let unit = Unit::new(UnitId(0), "M").with_content(
            ContentEntry::new(m)
                .with_source(src, SourceKind::Production)
                .with_excluded(build),
        );
        (generation(tree.clone(), vec![unit], vec![]), tree)
    }

    #[test]
    fn test_excluded_path() {
        let (generation, tree) = scenario();
        let x = tree.lookup("/proj/m/build/x").unwrap();
        let info = generation.classify(x);
        assert!(info.is_excluded());
        assert_eq!(info.owning_unit(), None);
        assert!(generation.is_excluded(x));
        assert!(!generation.is_in_content(x));
        assert_eq!(generation.unit_for(x), None);
    }

    #[test]
    fn test_source_path() {
        let (generation, tree) = scenario();
        let foo = tree.lookup("/proj/m/src/pkg/Foo").unwrap();
        let pkg = tree.lookup("/proj/m/src/pkg").unwrap();
        let src = tree.lookup("/proj/m/src").unwrap();

        let info = generation.classify(foo);
        assert_eq!(info.owning_unit(), Some(UnitId(0)));
        assert_eq!(info.nearest_source_root(), Some(src));
        assert_eq!(generation.namespace_of(pkg).as_deref(), Some("pkg"));
        assert!(generation.is_in_source_content(foo));
        assert!(!generation.is_in_test_source_content(foo));
        assert_eq!(generation.source_kind_for(foo), Some(SourceKind::Production));
        assert_eq!(generation.source_root_for(foo), Some(src));
    }

    #[test]
    fn test_namespace_round_trip() {
        let (generation, tree) = scenario();
        let pkg = tree.lookup("/proj/m/src/pkg").unwrap();
        let found: Vec<_> = generation.directories_for_namespace("pkg", false).collect();
        assert_eq!(found, vec![pkg]);

        assert_eq!(generation.directories_for_namespace("nope", true).count(), 0);
        assert_eq!(generation.namespaces.missing_names(), 1);
        generation.on_low_memory();
        assert_eq!(generation.namespaces.missing_names(), 0);
    }

    #[test]
    fn test_order_entries_outside_roots_is_empty() {
        let (generation, tree) = scenario();
        let outside = tree.lookup("/proj").unwrap();
        assert!(generation.order_entries_for(outside).is_empty());

        let foo = tree.lookup("/proj/m/src/pkg/Foo").unwrap();
        let entries = generation.order_entries_for(foo);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].owner, UnitId(0));
    }

    #[test]
    fn test_iterate_content_skips_excluded() {
        let (generation, tree) = scenario();
        let mut visited = Vec::new();
        let completed = generation.iterate_content(
            |f| {
                visited.push(tree.path_of(f));
                true
            },
            None,
        );

        assert!(completed);
        assert_eq!(
            visited,
            vec![
                "/proj/m",
                "/proj/m/src",
                "/proj/m/src/pkg",
                "/proj/m/src/pkg/Foo",
                "/proj/m/README",
            ]
        );
    }

    #[test]
    fn test_iterate_content_filter_and_stop() {
        let (generation, tree) = scenario();
        let only_files = |f: FileId| !tree.is_directory(f);

        let mut files = Vec::new();
        generation.iterate_content(
            |f| {
                files.push(f);
                true
            },
            Some(&only_files),
        );
        assert_eq!(files.len(), 2);

        let mut calls = 0;
        let completed = generation.iterate_content(
            |_| {
                calls += 1;
                false
            },
            None,
        );
        assert!(!completed);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_nested_content_root_iterated_once() {
        let mut tree = MemoryTree::new();
        let outer = tree.mkdirs("/ws/app");
        let inner = tree.mkdirs("/ws/app/module");
        tree.touch("/ws/app/module/a.txt");
        let unit = Unit::new(UnitId(0), "app")
            .with_content(ContentEntry::new(outer))
            .with_content(ContentEntry::new(inner));
        let generation = generation(tree, vec![unit], vec![]);

        let mut count = 0;
        generation.iterate_content(
            |_| {
                count += 1;
                true
            },
            None,
        );
        assert_eq!(count, 3);
    }

    #[test]
    fn test_library_predicates() {
        let mut tree = MemoryTree::new();
        let m = tree.mkdirs("/ws/m");
        let classes = tree.mkdirs("/repo/lib/classes");
        let sources = tree.mkdirs("/repo/lib/sources");
        let util = tree.mkdirs("/repo/lib/sources/util");
        let lib = Library::new(LibraryId(0), "lib")
            .with_binary_root(classes)
            .with_source_root(sources);
        let unit = Unit::new(UnitId(0), "m")
            .with_content(ContentEntry::new(m))
            .with_library_dependency(LibraryId(0), false, Scope::Compile);
        let generation = generation(tree, vec![unit], vec![lib]);

        assert!(generation.is_in_library_classes(classes));
        assert_eq!(generation.class_root_for(classes), Some(classes));
        assert!(generation.is_in_library_source(util));
        assert!(!generation.is_in_content(util));
        assert_eq!(generation.source_root_for(util), Some(sources));

        assert_eq!(generation.namespace_of(util).as_deref(), Some("util"));
        assert_eq!(
            generation.directories_for_namespace("util", true).collect::<Vec<_>>(),
            vec![util]
        );
        assert_eq!(generation.directories_for_namespace("util", false).count(), 0);
    }

    #[test]
    fn test_test_sources_with_prefix() {
        let mut tree = MemoryTree::new();
        let m = tree.mkdirs("/ws/m");
        let tests = tree.mkdirs("/ws/m/tests");
        let deep = tree.mkdirs("/ws/m/tests/io");
        let unit = Unit::new(UnitId(0), "m").with_content(
            ContentEntry::new(m).with_folder(
                ContentFolder::new(tests, SourceKind::Test).with_namespace_prefix("org.demo"),
            ),
        );
        let generation = generation(tree, vec![unit], vec![]);

        assert!(generation.is_in_test_source_content(deep));
        assert_eq!(generation.namespace_of(deep).as_deref(), Some("org.demo.io"));
        assert_eq!(
            generation
                .directories_for_namespace("org.demo.io", false)
                .collect::<Vec<_>>(),
            vec![deep]
        );
        assert_eq!(
            generation
                .directories_for_namespace("org.demo", false)
                .collect::<Vec<_>>(),
            vec![tests]
        );
        assert_eq!(generation.directories_for_namespace("org", false).count(), 0);
    }

    #[test]
    fn test_ignored_directory_inside_content() {
        let mut tree = MemoryTree::new();
        let m = tree.mkdirs("/ws/m");
        let git = tree.mkdirs("/ws/m/.git/refs");
        let unit = Unit::new(UnitId(0), "m").with_content(ContentEntry::new(m));
        let generation = generation(tree, vec![unit], vec![]);

        assert!(generation.is_ignored(git));
        assert_eq!(generation.unit_for(git), None);
        assert!(generation.is_in_content(m));
        assert_eq!(generation.content_root_for(m), Some(m));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        /// A chain `/d0/d1/...`; level `i` may be a content root of unit `i`
        /// and may be excluded from the unit owning the nearest content root
        /// above it.
        fn chain(content: &[bool], excluded: &[bool]) -> (MemoryTree, Vec<FileId>, Vec<Unit>) {
            let mut tree = MemoryTree::new();
            let mut path = String::new();
            let mut dirs = Vec::new();
            for i in 0..content.len() {
                path.push_str(&format!("/d{}", i));
                dirs.push(tree.mkdirs(&path));
            }

            let mut units: Vec<Unit> = Vec::new();
            for (i, &dir) in dirs.iter().enumerate() {
                if content[i] {
                    units.push(
                        Unit::new(UnitId(i as u32), format!("u{}", i))
                            .with_content(ContentEntry::new(dir)),
                    );
                } else if excluded[i] {
                    if let Some(owner) = units.last_mut() {
                        owner.content_entries[0].excluded.push(dir);
                    }
                }
            }
            (tree, dirs, units)
        }

        proptest! {
            #[test]
            fn prop_nearest_content_root_wins(
                content in prop::collection::vec(any::<bool>(), 1..8),
                depth in 0usize..8,
            ) {
                let excluded = vec![false; content.len()];
                let (tree, dirs, units) = chain(&content, &excluded);
                let depth = depth % dirs.len();
                let generation = generation(tree, units, vec![]);

                let expected = (0..=depth).rev().find(|&i| content[i]);
                let info = generation.classify(dirs[depth]);
                prop_assert_eq!(info.nearest_content_root(), expected.map(|i| dirs[i]));
                prop_assert_eq!(info.owning_unit(), expected.map(|i| UnitId(i as u32)));
            }

            #[test]
            fn prop_query_order_does_not_matter(
                content in prop::collection::vec(any::<bool>(), 1..8),
                excluded in prop::collection::vec(any::<bool>(), 8),
                order in Just((0usize..8).collect::<Vec<_>>()).prop_shuffle(),
            ) {
                let (tree, dirs, units) = chain(&content, &excluded[..content.len()]);
                let forward = generation(tree.clone(), units.clone(), vec![]);
                let shuffled = generation(tree, units, vec![]);

                let expected: Vec<_> = dirs.iter().map(|&d| forward.classify(d)).collect();
                for i in order.into_iter().filter(|&i| i < dirs.len()) {
                    let got = shuffled.classify(dirs[i]);
                    prop_assert_eq!(&*got, &*expected[i]);
                }
            }
        }
    }
}
