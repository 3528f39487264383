//! Directory classifier: turns a root hierarchy into a [`DirectoryInfo`] and
//! a namespace prefix.
//!
//! Precedence is always nearest-first and re-derived for every root:
//!
//! ```text
//! hierarchy (nearest first)        question answered
//! ─────────────────────────        ──────────────────────────────────────
//! [r0, r1, r2, ...]  ──► module root   first content root not excluded by
//!                                      its own unit; an exclusion seen
//!                                      first stops the scan
//!                    ──► library root  first library binary (or source)
//!                                      root not excluded by every library
//!                                      declaring it
//!                    ──► package root  source/library root the namespace
//!                                      and source kind derive from
//! ```

use std::collections::HashSet;

use crate::model::LibraryId;
use crate::vfs::{FileId, FileTree};

use super::catalog::RootCatalog;
use super::info::{DirectoryInfo, InfoKind};

/// Classification of one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RootClassification {
    pub info: DirectoryInfo,
    /// Namespace prefix of the root; `None` when it is outside every
    /// namespace-bearing root.
    pub namespace: Option<String>,
}

/// Stateless view over one generation's catalog.
pub(crate) struct Classifier<'a> {
    tree: &'a dyn FileTree,
    catalog: &'a RootCatalog,
}

impl<'a> Classifier<'a> {
    pub fn new(tree: &'a dyn FileTree, catalog: &'a RootCatalog) -> Self {
        Self { tree, catalog }
    }

    /// Nearest content root governing the hierarchy.
    ///
    /// Exclusions between a source folder and its content root do not cut
    /// the scan: a source folder declared under an excluded folder stays in
    /// its unit.
    pub fn module_root(&self, hierarchy: &[FileId]) -> Option<FileId> {
        let mut below_source_folder = false;
        for &root in hierarchy {
            below_source_folder |= self.catalog.content_folder(root).is_some();

            let excluded_from = self.catalog.excluded_from_unit(root);
            if let Some(unit) = self.catalog.content_root_of(root) {
                if excluded_from != Some(unit) {
                    return Some(root);
                }
            }
            if below_source_folder {
                continue;
            }
            if excluded_from.is_some() || self.catalog.is_excluded_from_workspace(root) {
                return None;
            }
        }
        None
    }

    /// Nearest library source (`source = true`) or binary root.
    ///
    /// Library exclusions accumulate while walking up; a root is skipped only
    /// when every library declaring it has excluded it at or below this
    /// point.
    pub fn library_root(&self, hierarchy: &[FileId], source: bool) -> Option<FileId> {
        let mut ignored: HashSet<LibraryId> = HashSet::new();
        for &root in hierarchy {
            ignored.extend(self.catalog.excluding_libraries(root).iter().copied());

            let (is_root, owners) = if source {
                (
                    self.catalog.is_library_source(root),
                    self.catalog.source_libraries(root),
                )
            } else {
                (
                    self.catalog.is_library_class(root),
                    self.catalog.class_libraries(root),
                )
            };
            if is_root && (owners.is_empty() || !owners.iter().all(|l| ignored.contains(l))) {
                return Some(root);
            }
        }
        None
    }

    /// Nearest content root in the hierarchy regardless of exclusions.
    pub fn nearest_content_root(&self, hierarchy: &[FileId]) -> Option<FileId> {
        hierarchy
            .iter()
            .copied()
            .find(|root| self.catalog.is_content_root(*root))
    }

    /// Root the namespace and source folder derive from.
    pub fn package_root(
        &self,
        hierarchy: &[FileId],
        module_root: Option<FileId>,
        library_class_root: Option<FileId>,
        library_source_root: Option<FileId>,
    ) -> Option<FileId> {
        let module_unit = module_root.and_then(|m| self.catalog.content_root_of(m));
        for &root in hierarchy {
            if let Some(unit) = module_unit {
                if library_source_root.is_none() && self.catalog.is_source_root_of(root, unit) {
                    return Some(root);
                }
            }
            if Some(root) == library_class_root || Some(root) == library_source_root {
                return Some(root);
            }
            if Some(root) == module_root
                && !self.catalog.is_source_root(root)
                && library_source_root.is_none()
                && library_class_root.is_none()
            {
                return None;
            }
        }
        None
    }

    /// Classify a root given its hierarchy.
    pub fn classify(&self, root: FileId, hierarchy: &[FileId]) -> RootClassification {
        let module_root = self.module_root(hierarchy);
        let library_class_root = self.library_root(hierarchy, false);
        let library_source_root = self.library_root(hierarchy, true);

        let in_project =
            module_root.is_some() || library_class_root.is_some() || library_source_root.is_some();
        if !in_project {
            return RootClassification {
                info: self.outside_project(root, hierarchy),
                namespace: None,
            };
        }

        let source_root = self.package_root(hierarchy, module_root, None, library_source_root);
        let module_source_root = self.package_root(hierarchy, module_root, None, None);
        let content_folder = module_source_root
            .and_then(|r| self.catalog.content_folder(r))
            .cloned();

        let info = DirectoryInfo {
            kind: InfoKind::InProject,
            root: Some(root),
            owning_unit: module_root.and_then(|m| self.catalog.content_root_of(m)),
            nearest_content_root: module_root,
            nearest_source_root: source_root,
            content_folder,
            library_class_root,
            in_module_source: module_source_root.is_some(),
            in_library_source: library_source_root.is_some(),
        };

        let namespace = self.namespace_prefix(
            root,
            hierarchy,
            module_root,
            library_class_root,
            library_source_root,
        );

        RootClassification { info, namespace }
    }

    fn outside_project(&self, root: FileId, hierarchy: &[FileId]) -> DirectoryInfo {
        let saw_exclusion = hierarchy.iter().any(|&r| {
            self.catalog.excluded_from_unit(r).is_some()
                || self.catalog.is_excluded_from_workspace(r)
                || !self.catalog.excluding_libraries(r).is_empty()
        });
        if !saw_exclusion {
            return DirectoryInfo::not_under_project();
        }
        match self.nearest_content_root(hierarchy) {
            Some(content_root) => DirectoryInfo::excluded_in_content(root, content_root),
            None => DirectoryInfo::excluded(),
        }
    }

    fn namespace_prefix(
        &self,
        root: FileId,
        hierarchy: &[FileId],
        module_root: Option<FileId>,
        library_class_root: Option<FileId>,
        library_source_root: Option<FileId>,
    ) -> Option<String> {
        let package_root = self.package_root(
            hierarchy,
            module_root,
            library_class_root,
            library_source_root,
        )?;
        let seed = self.catalog.namespace_seed(package_root)?;
        if package_root == root {
            return Some(seed.to_string());
        }

        let relative = self.relative_namespace(root, package_root);
        Some(if seed.is_empty() {
            relative
        } else {
            format!("{}.{}", seed, relative)
        })
    }

    /// Dotted path from `ancestor` down to `dir`.
    fn relative_namespace(&self, dir: FileId, ancestor: FileId) -> String {
        let mut names = Vec::new();
        let mut current = Some(dir);
        while let Some(id) = current {
            if id == ancestor {
                break;
            }
            names.push(self.tree.name(id));
            current = self.tree.parent(id);
        }
        names.reverse();
        names.join(".")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::index::hierarchy;
    use crate::model::{ContentEntry, ContentFolder, Library, Scope, SourceKind, Unit, UnitId};
    use crate::vfs::{IgnorePatterns, MemoryTree};

    fn classify(
        tree: &MemoryTree,
        units: &[Unit],
        libraries: &[Library],
        path: &str,
    ) -> RootClassification {
        let libraries: HashMap<_, _> = libraries.iter().map(|l| (l.id, l.clone())).collect();
        let catalog = RootCatalog::build(units, &libraries, &[], false);
        let root = tree.lookup(path).unwrap();
        let h = hierarchy::walk(tree, &IgnorePatterns::default(), &catalog, root, 1000).unwrap();
        Classifier::new(tree, &catalog).classify(root, &h)
    }

    #[test]
    fn test_excluded_root_has_no_owner() {
        let mut tree = MemoryTree::new();
        let m = tree.mkdirs("/proj/m");
        let src = tree.mkdirs("/proj/m/src");
        let build = tree.mkdirs("/proj/m/build");
        let unit = Unit::new(UnitId(0), "M").with_content(
            ContentEntry::new(m)
                .with_source(src, SourceKind::Production)
                .with_excluded(build),
        );

        let result = classify(&tree, &[unit], &[], "/proj/m/build");
        assert!(result.info.is_excluded());
        assert_eq!(result.info.owning_unit(), None);
        assert_eq!(result.info.nearest_content_root(), Some(m));
        assert_eq!(result.namespace, None);
    }

    #[test]
    fn test_source_root_classification() {
        let mut tree = MemoryTree::new();
        let m = tree.mkdirs("/proj/m");
        let src = tree.mkdirs("/proj/m/src");
        let unit = Unit::new(UnitId(0), "M").with_content(
            ContentEntry::new(m).with_folder(
                ContentFolder::new(src, SourceKind::Test).with_namespace_prefix("com.acme"),
            ),
        );

        let result = classify(&tree, &[unit], &[], "/proj/m/src");
        assert!(result.info.is_in_project());
        assert_eq!(result.info.owning_unit(), Some(UnitId(0)));
        assert_eq!(result.info.nearest_source_root(), Some(src));
        assert_eq!(result.info.source_kind(), Some(SourceKind::Test));
        assert!(result.info.is_in_module_source());
        assert_eq!(result.namespace.as_deref(), Some("com.acme"));
    }

    #[test]
    fn test_content_root_outside_sources_has_no_namespace() {
        let mut tree = MemoryTree::new();
        let m = tree.mkdirs("/proj/m");
        let src = tree.mkdirs("/proj/m/src");
        let unit = Unit::new(UnitId(0), "M")
            .with_content(ContentEntry::new(m).with_source(src, SourceKind::Production));

        let result = classify(&tree, &[unit], &[], "/proj/m");
        assert!(result.info.is_in_project());
        assert_eq!(result.info.nearest_source_root(), None);
        assert!(!result.info.is_in_module_source());
        assert_eq!(result.namespace, None);
    }

    #[test]
    fn test_nested_content_root_under_exclusion() {
        let mut tree = MemoryTree::new();
        let outer = tree.mkdirs("/ws/a");
        let excluded = tree.mkdirs("/ws/a/vendor");
        let inner = tree.mkdirs("/ws/a/vendor/b");
        let a = Unit::new(UnitId(0), "a")
            .with_content(ContentEntry::new(outer).with_excluded(excluded));
        let b = Unit::new(UnitId(1), "b").with_content(ContentEntry::new(inner));

        let result = classify(&tree, &[a, b], &[], "/ws/a/vendor/b");
        assert!(result.info.is_in_project());
        assert_eq!(result.info.owning_unit(), Some(UnitId(1)));
        assert_eq!(result.info.nearest_content_root(), Some(inner));
    }

    #[test]
    fn test_source_folder_under_exclusion_stays_in_unit() {
        let mut tree = MemoryTree::new();
        let m = tree.mkdirs("/p/m");
        let gen = tree.mkdirs("/p/m/target");
        let gen_src = tree.mkdirs("/p/m/target/generated");
        let unit = Unit::new(UnitId(0), "m").with_content(
            ContentEntry::new(m)
                .with_excluded(gen)
                .with_source(gen_src, SourceKind::Production),
        );

        let result = classify(&tree, &[unit], &[], "/p/m/target/generated");
        assert_eq!(result.info.owning_unit(), Some(UnitId(0)));
        assert!(result.info.is_in_module_source());
    }

    #[test]
    fn test_exclusion_inside_source_folder_still_excludes() {
        let mut tree = MemoryTree::new();
        let m = tree.mkdirs("/p/m");
        let src = tree.mkdirs("/p/m/src");
        let gen = tree.mkdirs("/p/m/src/gen");
        let unit = Unit::new(UnitId(0), "m").with_content(
            ContentEntry::new(m)
                .with_source(src, SourceKind::Production)
                .with_excluded(gen),
        );

        let result = classify(&tree, &[unit], &[], "/p/m/src/gen");
        assert!(result.info.is_excluded());
    }

    #[test]
    fn test_library_exclusion_scoped_to_library() {
        let mut tree = MemoryTree::new();
        let m = tree.mkdirs("/p/m");
        let shared = tree.mkdirs("/repo/shared");
        let l1 = Library::new(LibraryId(1), "l1")
            .with_binary_root(shared)
            .with_excluded_root(shared);
        let l2 = Library::new(LibraryId(2), "l2").with_binary_root(shared);
        let only_l1 = Unit::new(UnitId(0), "m")
            .with_content(ContentEntry::new(m))
            .with_library_dependency(LibraryId(1), false, Scope::Compile);
        let both = only_l1
            .clone()
            .with_library_dependency(LibraryId(2), false, Scope::Compile);

        let hidden = classify(&tree, &[only_l1], &[l1.clone()], "/repo/shared");
        assert!(hidden.info.is_excluded());

        let visible = classify(&tree, &[both], &[l1, l2], "/repo/shared");
        assert!(visible.info.is_in_project());
        assert_eq!(visible.info.library_class_root(), Some(shared));
        assert_eq!(visible.namespace.as_deref(), Some(""));
    }

    #[test]
    fn test_source_root_outside_content_is_not_under_project() {
        let mut tree = MemoryTree::new();
        let a = tree.mkdirs("/a");
        let stray = tree.mkdirs("/elsewhere/src");
        let unit = Unit::new(UnitId(0), "m")
            .with_content(ContentEntry::new(a).with_source(stray, SourceKind::Production));

        let result = classify(&tree, &[unit], &[], "/elsewhere/src");
        assert!(result.info.is_not_under_project());
        assert!(!result.info.is_excluded());
        assert_eq!(result.namespace, None);
    }
}
