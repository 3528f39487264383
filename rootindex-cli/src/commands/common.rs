//! Common types and utilities shared across CLI commands.

use std::path::Path;
use std::sync::Arc;

use rootindex::config::IndexConfig;
use rootindex::index::{IndexSources, RootIndex};
use rootindex::model::{StaticExcludes, WorkspaceManifest, WorkspaceModel};
use rootindex::vfs::{path_key, scan_into, FileId, FileTree, MemoryTree};
use tracing::{info, warn};

use crate::error::CliError;

/// An index built from a manifest, together with the scanned tree.
pub struct LoadedWorkspace {
    pub tree: Arc<MemoryTree>,
    pub index: RootIndex,
}

impl LoadedWorkspace {
    /// Tree handle for a path given on the command line.
    pub fn resolve_path(&self, path: &Path) -> Result<FileId, CliError> {
        let key = path_key(path);
        self.tree
            .lookup(&key)
            .ok_or_else(|| CliError::UnknownPath(key))
    }

    /// Absolute path of a handle, for output.
    pub fn display_path(&self, file: FileId) -> String {
        self.tree.path_of(file)
    }
}

/// Load the configuration from `path`, or the default location.
pub fn load_config(path: Option<&Path>) -> Result<IndexConfig, CliError> {
    match path {
        Some(path) if path.exists() => Ok(IndexConfig::load_from(path)?),
        Some(path) => {
            info!(path = %path.display(), "Config file not found, using defaults");
            Ok(IndexConfig::default())
        }
        None => Ok(IndexConfig::load()?),
    }
}

/// Scan every root the manifest mentions and build the first generation.
pub fn load_workspace(manifest_path: &Path, config: &IndexConfig) -> Result<LoadedWorkspace, CliError> {
    let manifest = WorkspaceManifest::load(manifest_path)?;

    let mut tree = MemoryTree::new();
    for root in manifest.scan_roots() {
        if let Err(e) = scan_into(&mut tree, &root) {
            warn!(path = %root.display(), error = %e, "Declared path is not readable, skipping");
        }
    }

    let resolved = manifest.resolve(&tree)?;
    let model = Arc::new(WorkspaceModel::with_declarations(
        resolved.units,
        resolved.libraries,
    ));
    let tree = Arc::new(tree);
    let shared_tree: Arc<dyn FileTree> = tree.clone();

    let sources = IndexSources::new(shared_tree, model.clone(), model)
        .with_ignore_policy(Arc::new(config.ignore_patterns()))
        .with_exclude_policy(Arc::new(StaticExcludes(resolved.excluded)));
    let index = RootIndex::new(sources, config.clone())?;

    Ok(LoadedWorkspace { tree, index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_workspace(temp: &TempDir) -> std::path::PathBuf {
        let base = temp.path();
        std::fs::create_dir_all(base.join("app/src/com/acme")).unwrap();
        std::fs::create_dir_all(base.join("app/build")).unwrap();
        std::fs::write(base.join("app/src/com/acme/Main.java"), b"class Main {}").unwrap();

        let app = base.join("app");
        let manifest = format!(
            r#"{{
                "units": [{{
                    "name": "app",
                    "content": [{{
                        "root": "{app}",
                        "sources": [{{ "path": "{app}/src" }}],
                        "excluded": ["{app}/build"]
                    }}]
                }}]
            }}"#,
            app = path_key(&app)
        );
        let manifest_path = base.join("rootindex.json");
        std::fs::write(&manifest_path, manifest).unwrap();
        manifest_path
    }

    #[test]
    fn test_load_workspace_classifies_scanned_paths() {
        let temp = TempDir::new().unwrap();
        let manifest_path = write_workspace(&temp);

        let workspace = load_workspace(&manifest_path, &IndexConfig::default()).unwrap();
        let acme = workspace
            .resolve_path(&temp.path().join("app/src/com/acme"))
            .unwrap();
        let build = workspace.resolve_path(&temp.path().join("app/build")).unwrap();

        assert!(workspace.index.classify(acme).is_in_module_source());
        assert_eq!(workspace.index.namespace_of(acme).as_deref(), Some("com.acme"));
        assert!(workspace.index.classify(build).is_excluded());
    }

    #[test]
    fn test_unknown_path_is_reported() {
        let temp = TempDir::new().unwrap();
        let manifest_path = write_workspace(&temp);
        let workspace = load_workspace(&manifest_path, &IndexConfig::default()).unwrap();

        let err = workspace
            .resolve_path(&temp.path().join("elsewhere"))
            .unwrap_err();
        assert!(matches!(err, CliError::UnknownPath(_)));
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(Some(&temp.path().join("absent.ini"))).unwrap();
        assert_eq!(config, IndexConfig::default());
    }
}
