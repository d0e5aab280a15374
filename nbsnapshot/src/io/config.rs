//! Snapshot configuration loaded from `nbsnapshot.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default config file name, looked up in the invocation directory.
pub const CONFIG_FILE_NAME: &str = "nbsnapshot.toml";

/// Snapshot configuration (TOML).
///
/// Missing fields default to the values the tool has always used, so an
/// absent file and an empty file behave the same.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Name of the directory all notebooks live in.
    pub workdir_name: String,

    /// Output subdirectory (relative to the working directory).
    pub output_dir: String,

    /// Regex matched against file names when no files are given explicitly.
    pub include_pattern: String,

    /// File names that are never snapshotted.
    pub denylist: Vec<String>,

    /// How to decide that an existing snapshot is still current.
    pub staleness: StalenessStrategy,

    /// Prefix of the link back to the source notebook in the disclaimer.
    pub source_link_prefix: String,

    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StalenessStrategy {
    /// Skip when the snapshot is newer than the source.
    #[default]
    Mtime,
    /// Skip when the source digest matches the one recorded at last snapshot.
    ContentHash,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Engine command; the timeout, output and input arguments are appended.
    pub command: Vec<String>,

    /// Per-cell timeout passed to the engine, in seconds.
    pub timeout_secs: u64,

    /// Wall-clock bound for the whole engine process, in seconds.
    pub process_timeout_secs: u64,

    /// Truncate captured engine stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            command: ["jupyter", "nbconvert", "--to", "notebook", "--execute"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            timeout_secs: 600,
            process_timeout_secs: 60 * 60,
            output_limit_bytes: 100_000,
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            workdir_name: "notebooks".to_string(),
            output_dir: "snapshot".to_string(),
            include_pattern: r"\.ipynb$".to_string(),
            denylist: Vec::new(),
            staleness: StalenessStrategy::default(),
            source_link_prefix: "../".to_string(),
            executor: ExecutorConfig::default(),
        }
    }
}

impl SnapshotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workdir_name.trim().is_empty() {
            return Err(anyhow!("workdir_name must be non-empty"));
        }
        if self.output_dir.trim().is_empty() {
            return Err(anyhow!("output_dir must be non-empty"));
        }
        self.include_regex()?;
        if self.executor.command.is_empty() || self.executor.command[0].trim().is_empty() {
            return Err(anyhow!("executor.command must be a non-empty array"));
        }
        if self.executor.timeout_secs == 0 {
            return Err(anyhow!("executor.timeout_secs must be > 0"));
        }
        if self.executor.process_timeout_secs == 0 {
            return Err(anyhow!("executor.process_timeout_secs must be > 0"));
        }
        if self.executor.output_limit_bytes == 0 {
            return Err(anyhow!("executor.output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn include_regex(&self) -> Result<Regex> {
        Regex::new(&self.include_pattern)
            .with_context(|| format!("invalid include_pattern '{}'", self.include_pattern))
    }

    pub fn is_denied(&self, file_name: &str) -> bool {
        self.denylist.iter().any(|denied| denied == file_name)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SnapshotConfig::default()`.
pub fn load_config(path: &Path) -> Result<SnapshotConfig> {
    if !path.exists() {
        let cfg = SnapshotConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SnapshotConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
