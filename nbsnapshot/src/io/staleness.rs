//! Staleness checks deciding whether an existing snapshot can be kept.
//!
//! [`StalenessCheck`] hides the strategy from the batch loop. The default
//! compares modification times; [`ContentHashCheck`] compares SHA-256 digests
//! recorded in a manifest next to the snapshots.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result, anyhow};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::io::config::StalenessStrategy;
use crate::io::notebook_store::write_atomic;
use crate::io::paths::SnapshotPaths;

/// Decides whether a snapshot is current for its source notebook.
pub trait StalenessCheck {
    /// True when `output` is current for `input` and the notebook can be skipped.
    fn is_up_to_date(&self, input: &Path, output: &Path) -> Result<bool>;

    /// Called after `output` was written from `input`.
    fn record(&self, _input: &Path, _output: &Path) -> Result<()> {
        Ok(())
    }
}

/// Build the check for the configured strategy.
pub fn staleness_check(
    strategy: StalenessStrategy,
    paths: &SnapshotPaths,
) -> Box<dyn StalenessCheck> {
    match strategy {
        StalenessStrategy::Mtime => Box::new(MtimeCheck),
        StalenessStrategy::ContentHash => Box::new(ContentHashCheck::new(&paths.manifest_path)),
    }
}

/// Skip when the source is strictly older than the snapshot.
pub fn skip_by_mtime(input_mtime: SystemTime, output_mtime: SystemTime) -> bool {
    input_mtime < output_mtime
}

/// Modification-time heuristic. Clock skew can cause false skips.
#[derive(Debug, Clone, Copy, Default)]
pub struct MtimeCheck;

impl StalenessCheck for MtimeCheck {
    fn is_up_to_date(&self, input: &Path, output: &Path) -> Result<bool> {
        if !output.exists() {
            return Ok(false);
        }
        let input_mtime = modified(input)?;
        let output_mtime = modified(output)?;
        Ok(skip_by_mtime(input_mtime, output_mtime))
    }
}

fn modified(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .with_context(|| format!("read mtime {}", path.display()))
}

/// Digest comparison against `<output_dir>/.sources.json`.
#[derive(Debug, Clone)]
pub struct ContentHashCheck {
    manifest_path: PathBuf,
}

impl ContentHashCheck {
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
        }
    }

    fn load_manifest(&self) -> Result<BTreeMap<String, String>> {
        if !self.manifest_path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.manifest_path)
            .with_context(|| format!("read {}", self.manifest_path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("parse {}", self.manifest_path.display()))
    }

    fn write_manifest(&self, manifest: &BTreeMap<String, String>) -> Result<()> {
        let mut buf = serde_json::to_string_pretty(manifest).context("serialize manifest")?;
        buf.push('\n');
        write_atomic(&self.manifest_path, &buf)
    }
}

impl StalenessCheck for ContentHashCheck {
    fn is_up_to_date(&self, input: &Path, output: &Path) -> Result<bool> {
        if !output.exists() {
            return Ok(false);
        }
        let manifest = self.load_manifest()?;
        let Some(recorded) = manifest.get(&file_key(input)?) else {
            return Ok(false);
        };
        let current = file_sha256(input)?;
        debug!(file = %input.display(), %recorded, %current, "compared digests");
        Ok(*recorded == current)
    }

    fn record(&self, input: &Path, _output: &Path) -> Result<()> {
        let mut manifest = self.load_manifest()?;
        manifest.insert(file_key(input)?, file_sha256(input)?);
        self.write_manifest(&manifest)
    }
}

fn file_key(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("path has no file name {}", path.display()))
}

fn file_sha256(path: &Path) -> Result<String> {
    let contents = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let digest = hasher.finalize();
    Ok(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn set_mtime(path: &Path, time: SystemTime) {
        fs::File::options()
            .write(true)
            .open(path)
            .expect("open")
            .set_modified(time)
            .expect("set mtime");
    }

    #[test]
    fn skip_iff_input_strictly_older() {
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        let later = base + Duration::from_secs(5);
        assert!(skip_by_mtime(base, later));
        assert!(!skip_by_mtime(later, base));
        assert!(!skip_by_mtime(base, base));
    }

    #[test]
    fn mtime_check_requires_output() {
        let temp = tempdir().expect("tempdir");
        let input = temp.path().join("a.ipynb");
        fs::write(&input, "{}").expect("write");
        let output = temp.path().join("out.ipynb");
        assert!(!MtimeCheck.is_up_to_date(&input, &output).expect("check"));
    }

    #[test]
    fn mtime_check_compares_files() {
        let temp = tempdir().expect("tempdir");
        let input = temp.path().join("a.ipynb");
        let output = temp.path().join("out.ipynb");
        fs::write(&input, "{}").expect("write");
        fs::write(&output, "{}").expect("write");

        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        set_mtime(&input, base);
        set_mtime(&output, base + Duration::from_secs(60));
        assert!(MtimeCheck.is_up_to_date(&input, &output).expect("check"));

        set_mtime(&input, base + Duration::from_secs(120));
        assert!(!MtimeCheck.is_up_to_date(&input, &output).expect("check"));
    }

    #[test]
    fn content_hash_tracks_recorded_digest() {
        let temp = tempdir().expect("tempdir");
        let input = temp.path().join("a.ipynb");
        let output = temp.path().join("snapshot").join("a.ipynb");
        fs::create_dir_all(output.parent().expect("parent")).expect("mkdir");
        fs::write(&input, "{\"cells\": []}").expect("write");
        fs::write(&output, "{}").expect("write");

        let check = ContentHashCheck::new(temp.path().join("snapshot").join(".sources.json"));
        assert!(!check.is_up_to_date(&input, &output).expect("check"));

        check.record(&input, &output).expect("record");
        assert!(check.is_up_to_date(&input, &output).expect("check"));

        fs::write(&input, "{\"cells\": [1]}").expect("rewrite");
        assert!(!check.is_up_to_date(&input, &output).expect("check"));
    }

    #[test]
    fn content_hash_needs_output_file() {
        let temp = tempdir().expect("tempdir");
        let input = temp.path().join("a.ipynb");
        let output = temp.path().join("out.ipynb");
        fs::write(&input, "{}").expect("write");
        fs::write(&output, "{}").expect("write");
        let check = ContentHashCheck::new(temp.path().join(".sources.json"));
        check.record(&input, &output).expect("record");

        fs::remove_file(&output).expect("remove");
        assert!(!check.is_up_to_date(&input, &output).expect("check"));
    }
}
