//! Executor abstraction for running notebooks through an execution engine.
//!
//! The [`Executor`] trait decouples the batch loop from the actual engine
//! (`jupyter nbconvert --execute` by default). Tests use scripted executors
//! that write or withhold output without spawning processes.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::io::config::ExecutorConfig;
use crate::io::notebook_store::load_notebook;
use crate::io::process::run_command_with_timeout;
use crate::notebook::Notebook;

/// Parameters for one engine invocation.
#[derive(Debug, Clone)]
pub struct ExecRequest {
    /// Working directory for the engine process.
    pub workdir: PathBuf,
    /// Notebook to execute.
    pub input_path: PathBuf,
    /// Path the engine must write the executed notebook to.
    pub output_path: PathBuf,
    /// Per-cell timeout handed to the engine.
    pub timeout: Duration,
    /// Wall-clock bound for the whole engine process.
    pub process_timeout: Duration,
    /// Truncate captured engine output beyond this many bytes.
    pub output_limit_bytes: usize,
}

/// Result of one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// The engine exited 0 and wrote `output_path`.
    Completed { output_path: PathBuf },
    /// The engine exited non-zero, timed out, or wrote nothing.
    Failed(ExecFailure),
}

/// Why an engine invocation did not produce a notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecFailure {
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    /// Captured engine stderr, only shown at the highest verbosity.
    pub stderr: String,
}

impl fmt::Display for ExecFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.timed_out {
            return write!(f, "timed out");
        }
        match self.exit_code {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Abstraction over notebook execution engines.
pub trait Executor {
    /// Run the engine for `request`. `Err` is reserved for failures to run the
    /// engine at all (e.g. the command cannot be spawned).
    fn execute(&self, request: &ExecRequest) -> Result<ExecOutcome>;
}

/// Executor that spawns the configured nbconvert-style command.
pub struct NbconvertExecutor {
    command: Vec<String>,
}

impl NbconvertExecutor {
    pub fn new(cfg: &ExecutorConfig) -> Self {
        Self {
            command: cfg.command.clone(),
        }
    }

    fn build_command(&self, request: &ExecRequest) -> Result<Command> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("executor command is empty"))?;
        let mut cmd = Command::new(program);
        cmd.args(args)
            .arg(format!(
                "--ExecutePreprocessor.timeout={}",
                request.timeout.as_secs()
            ))
            .arg("--output")
            .arg(&request.output_path)
            .arg(&request.input_path)
            .current_dir(&request.workdir);
        Ok(cmd)
    }
}

impl Executor for NbconvertExecutor {
    #[instrument(
        skip_all,
        fields(input = %request.input_path.display(), timeout_secs = request.timeout.as_secs())
    )]
    fn execute(&self, request: &ExecRequest) -> Result<ExecOutcome> {
        info!("starting notebook execution");
        let cmd = self.build_command(request)?;
        let output = run_command_with_timeout(
            cmd,
            request.process_timeout,
            request.output_limit_bytes,
        )
        .with_context(|| format!("run {}", self.command.join(" ")))?;

        if !output.success() {
            warn!(
                exit_code = ?output.status.code(),
                timed_out = output.timed_out,
                "execution failed"
            );
            return Ok(ExecOutcome::Failed(ExecFailure {
                exit_code: output.status.code(),
                timed_out: output.timed_out,
                stderr: output.stderr_text(),
            }));
        }
        if !request.output_path.exists() {
            warn!(output = %request.output_path.display(), "engine exited 0 without output");
            return Ok(ExecOutcome::Failed(ExecFailure {
                exit_code: output.status.code(),
                timed_out: false,
                stderr: format!(
                    "missing executor output {}",
                    request.output_path.display()
                ),
            }));
        }

        debug!("execution completed successfully");
        Ok(ExecOutcome::Completed {
            output_path: request.output_path.clone(),
        })
    }
}

/// Run the executor and, on success, load the executed notebook and remove
/// the temporary output. Partial output of a failed run is removed too.
///
/// The outer `Result` carries errors that end the batch; the inner one a
/// per-notebook execution failure.
#[instrument(skip_all, fields(output_path = %request.output_path.display()))]
pub fn execute_and_load<E: Executor + ?Sized>(
    executor: &E,
    request: &ExecRequest,
) -> Result<std::result::Result<Notebook, ExecFailure>> {
    let output_path = match executor.execute(request)? {
        ExecOutcome::Completed { output_path } => output_path,
        ExecOutcome::Failed(failure) => {
            discard(&request.output_path)?;
            return Ok(Err(failure));
        }
    };
    let notebook = load_notebook(&output_path)?;
    discard(&output_path)?;
    Ok(Ok(notebook))
}

fn discard(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("remove {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::notebook_store::write_notebook;
    use crate::test_support::{ScriptedExecutor, notebook_with_counts};

    fn request(root: &Path) -> ExecRequest {
        ExecRequest {
            workdir: root.to_path_buf(),
            input_path: root.join("a.ipynb"),
            output_path: root.join(".a.executing.ipynb"),
            timeout: Duration::from_secs(600),
            process_timeout: Duration::from_secs(5),
            output_limit_bytes: 1000,
        }
    }

    #[test]
    fn execute_and_load_reads_and_removes_output() {
        let temp = tempfile::tempdir().expect("tempdir");
        let request = request(temp.path());
        let executed = notebook_with_counts(&[Some(1), Some(2)]);
        let fake = ScriptedExecutor::succeeding(executed.clone());

        let loaded = execute_and_load(&fake, &request)
            .expect("execute")
            .expect("completed");
        assert_eq!(loaded, executed);
        assert!(!request.output_path.exists());
    }

    #[test]
    fn execute_and_load_discards_partial_output_on_failure() {
        let temp = tempfile::tempdir().expect("tempdir");
        let request = request(temp.path());
        write_notebook(&request.output_path, &notebook_with_counts(&[Some(1)])).expect("seed");
        let fake = ScriptedExecutor::failing(2);

        let outcome = execute_and_load(&fake, &request).expect("execute");
        let failure = outcome.expect_err("failed");
        assert_eq!(failure.exit_code, Some(2));
        assert_eq!(failure.to_string(), "exit code 2");
        assert!(!request.output_path.exists());
    }

    #[test]
    fn builds_command_with_timeout_output_and_input() {
        let executor = NbconvertExecutor::new(&ExecutorConfig::default());
        let request = request(Path::new("/nb"));
        let cmd = executor.build_command(&request).expect("command");

        assert_eq!(cmd.get_program(), "jupyter");
        let args: Vec<String> = cmd
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "nbconvert",
                "--to",
                "notebook",
                "--execute",
                "--ExecutePreprocessor.timeout=600",
                "--output",
                "/nb/.a.executing.ipynb",
                "/nb/a.ipynb",
            ]
        );
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/nb")));
    }

    #[cfg(unix)]
    #[test]
    fn nbconvert_executor_reports_non_zero_exit() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = ExecutorConfig {
            command: vec![
                "sh".to_string(),
                "-c".to_string(),
                "echo kernel died >&2; exit 4".to_string(),
                "sh".to_string(),
            ],
            ..ExecutorConfig::default()
        };
        let outcome = NbconvertExecutor::new(&cfg)
            .execute(&request(temp.path()))
            .expect("execute");
        assert_eq!(
            outcome,
            ExecOutcome::Failed(ExecFailure {
                exit_code: Some(4),
                timed_out: false,
                stderr: "kernel died\n".to_string(),
            })
        );
    }

    #[cfg(unix)]
    #[test]
    fn nbconvert_executor_fails_when_output_missing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = ExecutorConfig {
            command: vec!["true".to_string()],
            ..ExecutorConfig::default()
        };
        let outcome = NbconvertExecutor::new(&cfg)
            .execute(&request(temp.path()))
            .expect("execute");
        assert!(matches!(outcome, ExecOutcome::Failed(_)));
    }
}
