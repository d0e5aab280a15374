//! Test-only helpers for constructing notebooks and fake executors.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::io::executor::{ExecFailure, ExecOutcome, ExecRequest, Executor};
use crate::io::notebook_store::write_notebook;
use crate::notebook::{Cell, Notebook};

/// Markdown cell with the given text.
pub fn markdown_cell(text: &str) -> Cell {
    Cell::markdown(
        crate::notebook::split_source(text),
        serde_json::json!({}),
    )
}

/// Code cell that was never populated (no source, no count).
pub fn empty_code_cell() -> Cell {
    Cell::code("", None)
}

/// Notebook with a markdown header followed by one code cell per entry.
///
/// `None` entries are code cells with source but no execution count.
pub fn notebook_with_counts(counts: &[Option<i64>]) -> Notebook {
    let mut cells = vec![markdown_cell("# Fixture")];
    for (i, count) in counts.iter().enumerate() {
        cells.push(Cell::code(&format!("x{i} = {i}\nprint(x{i})"), *count));
    }
    Notebook::new(cells)
}

/// Write `notebook` to `root/name`, creating `root` when needed.
pub fn write_fixture(root: &Path, name: &str, notebook: &Notebook) -> Result<()> {
    fs::create_dir_all(root)?;
    write_notebook(&root.join(name), notebook)
}

/// Executor that replays scripted outcomes without spawning processes.
///
/// Each call pops the next outcome; the last one repeats. Every request is
/// recorded for assertions.
pub struct ScriptedExecutor {
    outcomes: RefCell<Vec<Scripted>>,
    pub requests: RefCell<Vec<ExecRequest>>,
}

#[derive(Clone)]
pub enum Scripted {
    /// Write this notebook to the requested output path and succeed.
    Succeed(Notebook),
    /// Write partial output, then fail with this exit code.
    Fail(i32),
}

impl ScriptedExecutor {
    pub fn new(outcomes: Vec<Scripted>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn succeeding(notebook: Notebook) -> Self {
        Self::new(vec![Scripted::Succeed(notebook)])
    }

    pub fn failing(exit_code: i32) -> Self {
        Self::new(vec![Scripted::Fail(exit_code)])
    }

    fn next_outcome(&self) -> Option<Scripted> {
        let mut outcomes = self.outcomes.borrow_mut();
        if outcomes.len() > 1 {
            Some(outcomes.remove(0))
        } else {
            outcomes.first().cloned()
        }
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&self, request: &ExecRequest) -> Result<ExecOutcome> {
        self.requests.borrow_mut().push(request.clone());
        match self.next_outcome() {
            Some(Scripted::Succeed(notebook)) => {
                write_notebook(&request.output_path, &notebook)?;
                Ok(ExecOutcome::Completed {
                    output_path: request.output_path.clone(),
                })
            }
            Some(Scripted::Fail(exit_code)) => {
                fs::write(&request.output_path, "{\"cells\": [")?;
                Ok(ExecOutcome::Failed(ExecFailure {
                    exit_code: Some(exit_code),
                    timed_out: false,
                    stderr: "ModuleNotFoundError: No module named 'data'\n".to_string(),
                }))
            }
            None => Ok(ExecOutcome::Failed(ExecFailure {
                exit_code: None,
                timed_out: true,
                stderr: String::new(),
            })),
        }
    }
}
