//! One snapshot run over the selected notebooks.
//!
//! Each notebook is handled start to finish (check or execute, annotate,
//! write) before the next one. Per-notebook problems are reported through
//! [`ItemOutcome`]; only I/O and parse errors abort the batch.

use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::core::disclaimer::{Disclaimer, annotate};
use crate::core::order::{OrderViolation, check_order};
use crate::io::config::SnapshotConfig;
use crate::io::executor::{ExecFailure, ExecRequest, Executor, execute_and_load};
use crate::io::notebook_store::{load_notebook, write_notebook};
use crate::io::paths::SnapshotPaths;
use crate::io::select::select_inputs;
use crate::io::staleness::StalenessCheck;
use crate::notebook::Notebook;
use crate::report::BatchReport;

/// How notebooks are turned into snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Copy notebooks that were already executed in order.
    Check,
    /// Execute notebooks with the engine and copy the result.
    Execute,
}

/// Per-invocation options derived from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: Mode,
    /// Ignore the staleness check.
    pub force: bool,
    /// Date written into disclaimer cells.
    pub date: NaiveDate,
}

/// What happened to one notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Snapshot written.
    Snapshotted,
    /// Existing snapshot is current; nothing written.
    UpToDate,
    /// Notebook was not executed top to bottom; nothing written.
    OutOfOrder(OrderViolation),
    /// Engine failed; nothing written.
    ExecutionFailed(ExecFailure),
}

/// Select notebooks and snapshot each one, calling `on_item` after every
/// notebook.
pub fn run_batch<E, S, F>(
    paths: &SnapshotPaths,
    cfg: &SnapshotConfig,
    options: &RunOptions,
    files: &[String],
    executor: &E,
    staleness: &S,
    mut on_item: F,
) -> Result<BatchReport>
where
    E: Executor + ?Sized,
    S: StalenessCheck + ?Sized,
    F: FnMut(&str, &ItemOutcome),
{
    let selected = select_inputs(&paths.root, files, cfg)?;
    debug!(count = selected.len(), mode = ?options.mode, "selected notebooks");

    let mut report = BatchReport::default();
    for file_name in &selected {
        let outcome = match options.mode {
            Mode::Check => snapshot_checked(paths, cfg, options, file_name, staleness)?,
            Mode::Execute => {
                snapshot_executed(paths, cfg, options, file_name, executor, staleness)?
            }
        };
        on_item(file_name, &outcome);
        report.record(file_name, &outcome);
    }
    Ok(report)
}

#[instrument(skip_all, fields(file = %file_name))]
fn snapshot_checked<S: StalenessCheck + ?Sized>(
    paths: &SnapshotPaths,
    cfg: &SnapshotConfig,
    options: &RunOptions,
    file_name: &str,
    staleness: &S,
) -> Result<ItemOutcome> {
    let input = paths.input_path(file_name);
    let output = paths.output_path(file_name);
    if !options.force && staleness.is_up_to_date(&input, &output)? {
        debug!("snapshot up to date, skipping");
        return Ok(ItemOutcome::UpToDate);
    }

    let notebook = load_notebook(&input)?;
    if let Err(violation) = check_order(&notebook) {
        debug!(%violation, "not executed in order");
        return Ok(ItemOutcome::OutOfOrder(violation));
    }
    write_snapshot(paths, cfg, options, file_name, notebook, staleness)
}

#[instrument(skip_all, fields(file = %file_name))]
fn snapshot_executed<E, S>(
    paths: &SnapshotPaths,
    cfg: &SnapshotConfig,
    options: &RunOptions,
    file_name: &str,
    executor: &E,
    staleness: &S,
) -> Result<ItemOutcome>
where
    E: Executor + ?Sized,
    S: StalenessCheck + ?Sized,
{
    let request = ExecRequest {
        workdir: paths.root.clone(),
        input_path: paths.input_path(file_name),
        output_path: paths.execution_temp_path(file_name),
        timeout: Duration::from_secs(cfg.executor.timeout_secs),
        process_timeout: Duration::from_secs(cfg.executor.process_timeout_secs),
        output_limit_bytes: cfg.executor.output_limit_bytes,
    };
    match execute_and_load(executor, &request)? {
        Ok(notebook) => write_snapshot(paths, cfg, options, file_name, notebook, staleness),
        Err(failure) => Ok(ItemOutcome::ExecutionFailed(failure)),
    }
}

fn write_snapshot<S: StalenessCheck + ?Sized>(
    paths: &SnapshotPaths,
    cfg: &SnapshotConfig,
    options: &RunOptions,
    file_name: &str,
    mut notebook: Notebook,
    staleness: &S,
) -> Result<ItemOutcome> {
    let disclaimer = Disclaimer {
        file_name,
        source_link_prefix: &cfg.source_link_prefix,
        date: options.date,
    };
    annotate(&mut notebook, &disclaimer)?;

    let input = paths.input_path(file_name);
    let output = paths.output_path(file_name);
    write_notebook(&output, &notebook)?;
    staleness.record(&input, &output)?;
    info!(output = %output.display(), "snapshot written");
    Ok(ItemOutcome::Snapshotted)
}
