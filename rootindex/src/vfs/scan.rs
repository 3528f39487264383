//! Snapshot on-disk directories into a [`MemoryTree`].

use std::io;
use std::path::Path;

use tracing::{debug, warn};

use super::{FileId, MemoryTree};

/// Recursively copy the structure under `path` into `tree`.
///
/// Ancestors of `path` are created as plain directories. Symbolic links are
/// recorded as files and never followed, so link cycles cannot make the scan
/// loop. Unreadable subdirectories are logged and skipped.
///
/// # Errors
///
/// Returns an error if `path` itself does not exist or cannot be read.
pub fn scan_into(tree: &mut MemoryTree, path: &Path) -> io::Result<FileId> {
    let metadata = std::fs::symlink_metadata(path)?;
    let key = path_key(path);

    if !metadata.is_dir() {
        return Ok(tree.touch(&key));
    }

    let root = tree.mkdirs(&key);
    let mut entries = 0usize;
    scan_directory(tree, path, &key, &mut entries)?;

    debug!(path = %path.display(), entries, "Scanned directory into tree");
    Ok(root)
}

fn scan_directory(
    tree: &mut MemoryTree,
    real_dir: &Path,
    virtual_dir: &str,
    entries: &mut usize,
) -> io::Result<()> {
    let mut children: Vec<_> = std::fs::read_dir(real_dir)?
        .filter_map(|e| e.ok())
        .collect();
    // read_dir order is platform-defined
    children.sort_by_key(|e| e.file_name());

    for entry in children {
        let name = entry.file_name().to_string_lossy().into_owned();
        let virtual_path = format!("{}/{}", virtual_dir.trim_end_matches('/'), name);
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        *entries += 1;

        if is_dir {
            tree.mkdirs(&virtual_path);
            if let Err(e) = scan_directory(tree, &entry.path(), &virtual_path, entries) {
                warn!(
                    path = %entry.path().display(),
                    error = %e,
                    "Failed to read directory, skipping"
                );
            }
        } else {
            tree.touch(&virtual_path);
        }
    }

    Ok(())
}

/// Tree key for a real path: absolute, `/`-separated.
pub fn path_key(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let joined = absolute
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}", joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::FileTree;
    use tempfile::TempDir;

    #[test]
    fn test_scan_copies_structure() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("m/src/pkg")).unwrap();
        std::fs::write(temp.path().join("m/src/pkg/Foo.java"), b"class Foo {}").unwrap();
        std::fs::create_dir_all(temp.path().join("m/build")).unwrap();

        let mut tree = MemoryTree::new();
        let root = scan_into(&mut tree, temp.path()).unwrap();

        let key = path_key(temp.path());
        assert_eq!(tree.path_of(root), key);

        let foo = tree
            .lookup(&format!("{}/m/src/pkg/Foo.java", key))
            .expect("file should be scanned");
        assert!(!tree.is_directory(foo));

        let build = tree.lookup(&format!("{}/m/build", key)).unwrap();
        assert!(tree.is_directory(build));
    }

    #[test]
    fn test_scan_missing_path_fails() {
        let temp = TempDir::new().unwrap();
        let mut tree = MemoryTree::new();
        assert!(scan_into(&mut tree, &temp.path().join("missing")).is_err());
    }

    #[test]
    fn test_scan_single_file() {
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("dep.jar");
        std::fs::write(&jar, b"PK").unwrap();

        let mut tree = MemoryTree::new();
        let id = scan_into(&mut tree, &jar).unwrap();
        assert!(!tree.is_directory(id));
        assert_eq!(tree.name(id), "dep.jar");
    }

    #[test]
    fn test_path_key_normalizes() {
        assert_eq!(path_key(Path::new("/a/b/")), "/a/b");
        assert_eq!(path_key(Path::new("/")), "/");
    }
}
