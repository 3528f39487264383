//! Namespace index: dotted namespace name to the directories carrying it.
//!
//! Forward lookups (directory to namespace) walk up to the nearest registered
//! root. Reverse lookups (namespace to directories) are resolved recursively
//! through the parent namespace and memoized, with a separate negative set
//! for names that resolve to nothing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use tracing::debug;

use crate::telemetry::IndexStats;
use crate::vfs::{FileId, FileTree, IgnorePolicy};

use super::generation::Generation;
use super::hierarchy::possible_loop;

pub(crate) struct NamespaceIndex {
    prefix_roots: HashMap<String, Vec<FileId>>,
    root_prefix: HashMap<FileId, Option<String>>,
    results: DashMap<String, Arc<[FileId]>>,
    missing: DashSet<String>,
}

impl NamespaceIndex {
    pub fn new() -> Self {
        Self {
            prefix_roots: HashMap::new(),
            root_prefix: HashMap::new(),
            results: DashMap::new(),
            missing: DashSet::new(),
        }
    }

    /// Record the namespace of a root; `None` marks a root that carries no
    /// namespace and stops upward walks.
    pub fn register(&mut self, root: FileId, prefix: Option<String>) {
        if let Some(prefix) = &prefix {
            self.prefix_roots
                .entry(prefix.clone())
                .or_default()
                .push(root);
        }
        self.root_prefix.insert(root, prefix);
    }

    pub fn registered_roots(&self) -> impl Iterator<Item = FileId> + '_ {
        self.root_prefix.keys().copied()
    }

    #[cfg(test)]
    pub fn missing_names(&self) -> usize {
        self.missing.len()
    }

    /// Forget names known to resolve to nothing.
    pub fn on_low_memory(&self) {
        let dropped = self.missing.len();
        self.missing.clear();
        debug!(dropped, "Namespace negative cache cleared");
    }

    /// Dotted namespace of a directory.
    ///
    /// `None` for files, ignored directories, and directories outside every
    /// namespace-bearing root.
    pub fn namespace_of(
        &self,
        tree: &dyn FileTree,
        ignore: &dyn IgnorePolicy,
        dir: FileId,
        max_depth: usize,
    ) -> Option<String> {
        if !tree.is_directory(dir) {
            return None;
        }

        let mut names = Vec::new();
        let mut current = Some(dir);
        while let Some(d) = current {
            if names.len() >= max_depth {
                possible_loop(tree, dir, max_depth);
            }
            if ignore.is_ignored(tree, d) {
                return None;
            }
            if let Some(prefix) = self.root_prefix.get(&d) {
                let prefix = prefix.as_deref()?;
                names.reverse();
                return Some(join_namespace(prefix, &names));
            }
            names.push(tree.name(d));
            current = tree.parent(d);
        }
        None
    }

    /// Directories whose namespace is exactly `ns`, library sources included.
    pub fn directories(&self, generation: &Generation, ns: &str) -> Arc<[FileId]> {
        let stats: &IndexStats = generation.stats();
        if let Some(found) = self.results.get(ns) {
            stats.record_namespace_hit();
            return Arc::clone(found.value());
        }
        if self.missing.contains(ns) {
            stats.record_namespace_negative_hit();
            return Arc::from(Vec::new());
        }
        stats.record_namespace_miss();

        let tree = generation.tree();
        let mut result = Vec::new();

        if !ns.is_empty() && !ns.starts_with('.') {
            let mut split = ns.rfind('.');
            loop {
                let (parent, short) = match split {
                    Some(i) => (&ns[..i], &ns[i + 1..]),
                    None => ("", ns),
                };
                let parents = self.directories(generation, parent);
                for &parent_dir in parents.iter() {
                    let Some(child) = tree.find_child(parent_dir, short) else {
                        continue;
                    };
                    if tree.is_directory(child)
                        && generation.classify(child).is_in_project()
                        && generation.namespace_of(child).as_deref() == Some(ns)
                    {
                        result.push(child);
                    }
                }
                match split {
                    Some(i) => split = ns[..i].rfind('.'),
                    None => break,
                }
            }
        }

        if let Some(roots) = self.prefix_roots.get(ns) {
            result.extend(roots.iter().copied().filter(|r| tree.is_directory(*r)));
        }

        let mut seen = HashSet::new();
        result.retain(|d| seen.insert(*d));

        if result.is_empty() {
            debug!(namespace = ns, "Namespace resolves to no directories");
            self.missing.insert(ns.to_string());
            return Arc::from(Vec::new());
        }

        let result: Arc<[FileId]> = Arc::from(result);
        self.results.insert(ns.to_string(), Arc::clone(&result));
        result
    }
}

fn join_namespace(prefix: &str, names: &[&str]) -> String {
    let mut out = String::from(prefix);
    for name in names {
        if !out.is_empty() {
            out.push('.');
        }
        out.push_str(name);
    }
    out
}
