//! Working directory resolution and derived snapshot paths.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::io::config::SnapshotConfig;

/// Name of the digest manifest kept in the output directory.
pub const MANIFEST_FILE_NAME: &str = ".sources.json";

/// Resolve the directory notebooks are read from.
///
/// When `cwd` is already named `workdir_name` it is used as-is, otherwise the
/// subdirectory of that name is.
pub fn resolve_root(cwd: &Path, workdir_name: &str) -> PathBuf {
    if cwd.file_name() == Some(OsStr::new(workdir_name)) {
        cwd.to_path_buf()
    } else {
        cwd.join(workdir_name)
    }
}

/// All canonical paths for one snapshot run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    pub root: PathBuf,
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
}

impl SnapshotPaths {
    pub fn new(root: impl Into<PathBuf>, cfg: &SnapshotConfig) -> Self {
        let root = root.into();
        let output_dir = root.join(&cfg.output_dir);
        Self {
            manifest_path: output_dir.join(MANIFEST_FILE_NAME),
            output_dir,
            root,
        }
    }

    /// Resolve paths for the invocation directory, requiring the root to exist.
    pub fn discover(cwd: &Path, cfg: &SnapshotConfig) -> Result<Self> {
        let root = resolve_root(cwd, &cfg.workdir_name);
        if !root.is_dir() {
            return Err(anyhow!("missing directory {}", root.display()));
        }
        Ok(Self::new(root, cfg))
    }

    pub fn input_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Sibling path the execution engine writes to before the result is read
    /// back.
    pub fn execution_temp_path(&self, file_name: &str) -> PathBuf {
        let stem = Path::new(file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        self.root.join(format!(".{stem}.executing.ipynb"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_cwd_when_name_matches() {
        let cwd = Path::new("/repo/notebooks");
        assert_eq!(resolve_root(cwd, "notebooks"), PathBuf::from("/repo/notebooks"));
    }

    #[test]
    fn root_is_subdirectory_otherwise() {
        let cwd = Path::new("/repo");
        assert_eq!(resolve_root(cwd, "notebooks"), PathBuf::from("/repo/notebooks"));
    }

    #[test]
    fn derived_paths_are_deterministic() {
        let paths = SnapshotPaths::new("/repo/notebooks", &SnapshotConfig::default());
        assert_eq!(
            paths.output_path("a.ipynb"),
            PathBuf::from("/repo/notebooks/snapshot/a.ipynb")
        );
        assert_eq!(
            paths.manifest_path,
            PathBuf::from("/repo/notebooks/snapshot/.sources.json")
        );
        assert_eq!(
            paths.execution_temp_path("a.ipynb"),
            PathBuf::from("/repo/notebooks/.a.executing.ipynb")
        );
    }

    #[test]
    fn discover_errors_when_root_missing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = SnapshotPaths::discover(temp.path(), &SnapshotConfig::default())
            .expect_err("missing root");
        assert!(err.to_string().contains("missing directory"));
    }

    #[test]
    fn discover_finds_subdirectory() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(temp.path().join("notebooks")).expect("mkdir");
        let paths =
            SnapshotPaths::discover(temp.path(), &SnapshotConfig::default()).expect("discover");
        assert_eq!(paths.root, temp.path().join("notebooks"));
    }
}
