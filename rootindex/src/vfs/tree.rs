//! Arena-backed in-memory file tree.

use std::collections::HashMap;

use super::{FileId, FileTree};

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<FileId>,
    is_dir: bool,
    children: Vec<FileId>,
    by_name: HashMap<String, FileId>,
}

impl Node {
    fn new(name: impl Into<String>, parent: Option<FileId>, is_dir: bool) -> Self {
        Self {
            name: name.into(),
            parent,
            is_dir,
            children: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

/// In-memory file tree addressed by absolute `/`-separated paths.
///
/// Nodes are never removed, so every [`FileId`] handed out stays valid for
/// the lifetime of the tree. Build the tree first, then share it behind an
/// `Arc` with the index.
///
/// # Example
///
/// ```
/// use rootindex::vfs::{FileTree, MemoryTree};
///
/// let mut tree = MemoryTree::new();
/// let src = tree.mkdirs("/proj/m/src");
/// let file = tree.touch("/proj/m/src/Main.java");
///
/// assert_eq!(tree.parent(file), Some(src));
/// assert_eq!(tree.path_of(file), "/proj/m/src/Main.java");
/// assert!(!tree.is_directory(file));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryTree {
    nodes: Vec<Node>,
}

impl MemoryTree {
    /// Create a tree containing only the root directory `/`.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("", None, true)],
        }
    }

    /// Handle of the root directory.
    pub fn root(&self) -> FileId {
        FileId(0)
    }

    /// Number of entries, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Create a directory and all missing ancestors.
    ///
    /// Returns the existing handle when the directory is already present.
    /// Creation stops at an existing file on the path; that file's handle is
    /// returned unchanged.
    pub fn mkdirs(&mut self, path: &str) -> FileId {
        let mut current = self.root();
        for segment in segments(path) {
            current = self.child_or_insert(current, segment, true);
        }
        current
    }

    /// Create a file (and any missing parent directories).
    ///
    /// Like [`mkdirs`](Self::mkdirs), an existing file on the path is
    /// returned instead of gaining children.
    pub fn touch(&mut self, path: &str) -> FileId {
        let (dir, name) = match path.trim_end_matches('/').rsplit_once('/') {
            Some((dir, name)) => (dir, name),
            None => ("", path),
        };
        let parent = self.mkdirs(dir);
        self.child_or_insert(parent, name, false)
    }

    /// Resolve an absolute path to a handle.
    pub fn lookup(&self, path: &str) -> Option<FileId> {
        let mut current = self.root();
        for segment in segments(path) {
            current = self.find_child(current, segment)?;
        }
        Some(current)
    }

    fn child_or_insert(&mut self, parent: FileId, name: &str, is_dir: bool) -> FileId {
        // files never get children
        if !self.nodes[parent.index()].is_dir {
            return parent;
        }
        if let Some(existing) = self.nodes[parent.index()].by_name.get(name) {
            return *existing;
        }
        let id = FileId(self.nodes.len() as u32);
        self.nodes.push(Node::new(name, Some(parent), is_dir));
        let parent_node = &mut self.nodes[parent.index()];
        parent_node.children.push(id);
        parent_node.by_name.insert(name.to_string(), id);
        id
    }

    fn node(&self, file: FileId) -> Option<&Node> {
        self.nodes.get(file.index())
    }
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTree for MemoryTree {
    fn parent(&self, file: FileId) -> Option<FileId> {
        self.node(file).and_then(|n| n.parent)
    }

    fn children(&self, dir: FileId) -> &[FileId] {
        self.node(dir).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    fn find_child(&self, dir: FileId, name: &str) -> Option<FileId> {
        self.node(dir).and_then(|n| n.by_name.get(name).copied())
    }

    fn name(&self, file: FileId) -> &str {
        self.node(file).map(|n| n.name.as_str()).unwrap_or("")
    }

    fn is_directory(&self, file: FileId) -> bool {
        self.node(file).map(|n| n.is_dir).unwrap_or(false)
    }

    fn is_valid(&self, file: FileId) -> bool {
        file.index() < self.nodes.len()
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree_has_root_only() {
        let tree = MemoryTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.path_of(tree.root()), "/");
        assert!(tree.is_directory(tree.root()));
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_mkdirs_is_idempotent() {
        let mut tree = MemoryTree::new();
        let a = tree.mkdirs("/proj/m/src");
        let b = tree.mkdirs("/proj/m/src/");
        assert_eq!(a, b);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_lookup_and_children() {
        let mut tree = MemoryTree::new();
        let m = tree.mkdirs("/proj/m");
        let src = tree.mkdirs("/proj/m/src");
        let test = tree.mkdirs("/proj/m/test");

        assert_eq!(tree.lookup("/proj/m"), Some(m));
        assert_eq!(tree.lookup("/proj/missing"), None);
        assert_eq!(tree.children(m), &[src, test]);
        assert_eq!(tree.find_child(m, "test"), Some(test));
    }

    #[test]
    fn test_touch_creates_file_under_new_dirs() {
        let mut tree = MemoryTree::new();
        let file = tree.touch("/lib/dep.jar");
        assert!(!tree.is_directory(file));
        assert_eq!(tree.name(file), "dep.jar");
        assert_eq!(tree.path_of(file), "/lib/dep.jar");
    }

    #[test]
    fn test_mkdirs_stops_at_existing_file() {
        let mut tree = MemoryTree::new();
        let file = tree.touch("/x/file");
        let before = tree.len();

        assert_eq!(tree.mkdirs("/x/file/sub"), file);
        assert_eq!(tree.touch("/x/file/sub/leaf"), file);
        assert_eq!(tree.len(), before);
        assert!(tree.children(file).is_empty());
        assert!(!tree.is_directory(file));
        assert_eq!(tree.lookup("/x/file/sub"), None);
    }

    #[test]
    fn test_invalid_handle() {
        let tree = MemoryTree::new();
        let bogus = FileId(42);
        assert!(!tree.is_valid(bogus));
        assert_eq!(tree.parent(bogus), None);
        assert!(tree.children(bogus).is_empty());
        assert_eq!(tree.name(bogus), "");
    }
}
