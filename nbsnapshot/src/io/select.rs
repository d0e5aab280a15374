//! Candidate selection: explicit file arguments or a directory listing.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::io::config::SnapshotConfig;

/// Select the notebook file names to process.
///
/// Explicit arguments are reduced to their base file name (any directory
/// prefix is dropped) and keep their given order. Without arguments, every
/// visible regular file in `root` whose name matches `include_pattern` is
/// selected, sorted lexicographically. Hidden files (leading `.`) are never
/// listed. Denylisted names are always dropped and the
/// result is deduplicated by name, first occurrence wins.
pub fn select_inputs(
    root: &Path,
    explicit: &[String],
    cfg: &SnapshotConfig,
) -> Result<Vec<String>> {
    let candidates = if explicit.is_empty() {
        list_matching(root, cfg)?
    } else {
        explicit.iter().filter_map(|arg| base_name(arg)).collect()
    };

    let mut seen = HashSet::new();
    let mut selected = Vec::new();
    for name in candidates {
        if cfg.is_denied(&name) {
            debug!(file = %name, "denylisted, skipping");
            continue;
        }
        if seen.insert(name.clone()) {
            selected.push(name);
        }
    }
    Ok(selected)
}

fn list_matching(root: &Path, cfg: &SnapshotConfig) -> Result<Vec<String>> {
    let pattern = cfg.include_regex()?;
    let mut names = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("read {}", root.display()))? {
        let entry = entry.context("read entry")?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if pattern.is_match(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn base_name(arg: &str) -> Option<String> {
    Path::new(arg)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
