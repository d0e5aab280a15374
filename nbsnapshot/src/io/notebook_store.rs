//! Notebook load/store helpers with schema validation and canonical output.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;

use crate::core::canonical::to_canonical_json;
use crate::notebook::Notebook;

const NOTEBOOK_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/notebook/v4.schema.json"
));

/// Load a notebook from disk, checking the fields the pipeline relies on.
pub fn load_notebook(path: &Path) -> Result<Notebook> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read notebook {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse notebook {}", path.display()))?;
    validate_schema(&value).with_context(|| format!("validate notebook {}", path.display()))?;
    serde_json::from_value(value)
        .with_context(|| format!("deserialize notebook {}", path.display()))
}

/// Write a notebook in canonical form, replacing any existing file.
pub fn write_notebook(path: &Path, notebook: &Notebook) -> Result<()> {
    let payload = to_canonical_json(notebook)
        .with_context(|| format!("encode notebook {}", path.display()))?;
    write_atomic(path, &payload)
}

/// Write `contents` through a temp file in the same directory and rename it
/// over `path`.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = temp_path(path);
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(OsString::new);
    name.push(".tmp");
    path.with_file_name(name)
}

fn validate_schema(notebook: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(NOTEBOOK_SCHEMA).context("parse notebook schema")?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(notebook) {
        let messages = compiled
            .iter_errors(notebook)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "notebook schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}
