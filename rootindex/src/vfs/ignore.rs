//! Filesystem "ignored entry" predicate.

use glob::Pattern;
use tracing::warn;

use super::{FileId, FileTree};

/// Names ignored by default: VCS metadata and common build noise.
pub const DEFAULT_IGNORED_PATTERNS: &[&str] = &[
    "CVS",
    ".DS_Store",
    ".svn",
    ".pyc",
    ".pyo",
    "*.pyc",
    "*.pyo",
    ".git",
    "*.hprof",
    "_svn",
    ".hg",
    "*.lib",
    "*~",
    "__pycache__",
    ".bundle",
    "*.rbc",
];

/// Decides whether a tree entry is ignored by the filesystem layer.
///
/// The answer must be stable for a given entry during a generation.
pub trait IgnorePolicy: Send + Sync {
    /// Whether `file` should be treated as ignored.
    fn is_ignored(&self, tree: &dyn FileTree, file: FileId) -> bool;
}

/// Ignore policy matching entry names against glob patterns.
#[derive(Debug, Clone)]
pub struct IgnorePatterns {
    patterns: Vec<Pattern>,
}

impl IgnorePatterns {
    /// Compile a list of glob patterns. Invalid patterns are skipped.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter_map(|p| {
                let raw = p.as_ref().trim();
                if raw.is_empty() {
                    return None;
                }
                match Pattern::new(raw) {
                    Ok(pattern) => Some(pattern),
                    Err(e) => {
                        warn!(pattern = raw, error = %e, "Skipping invalid ignore pattern");
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    /// Policy that ignores nothing.
    pub fn none() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Whether a bare entry name matches any pattern.
    pub fn matches_name(&self, name: &str) -> bool {
        !name.is_empty() && self.patterns.iter().any(|p| p.matches(name))
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no patterns are configured.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for IgnorePatterns {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORED_PATTERNS.iter().copied())
    }
}

impl IgnorePolicy for IgnorePatterns {
    fn is_ignored(&self, tree: &dyn FileTree, file: FileId) -> bool {
        self.matches_name(tree.name(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemoryTree;

    #[test]
    fn test_default_patterns_match_vcs_dirs() {
        let patterns = IgnorePatterns::default();
        assert!(patterns.matches_name(".git"));
        assert!(patterns.matches_name("CVS"));
        assert!(patterns.matches_name("cache.pyc"));
        assert!(patterns.matches_name("notes~"));
        assert!(!patterns.matches_name("src"));
        assert!(!patterns.matches_name(""));
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let patterns = IgnorePatterns::new(["[", "build"]);
        assert_eq!(patterns.len(), 1);
        assert!(patterns.matches_name("build"));
    }

    #[test]
    fn test_policy_uses_entry_name() {
        let mut tree = MemoryTree::new();
        let git = tree.mkdirs("/proj/.git");
        let src = tree.mkdirs("/proj/src");
        let policy = IgnorePatterns::default();

        assert!(policy.is_ignored(&tree, git));
        assert!(!policy.is_ignored(&tree, src));
        assert!(!policy.is_ignored(&tree, tree.root()));
    }

    #[test]
    fn test_none_ignores_nothing() {
        let policy = IgnorePatterns::none();
        assert!(policy.is_empty());
        assert!(!policy.matches_name(".git"));
    }
}
