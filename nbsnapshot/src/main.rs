//! Notebook snapshot CLI.
//!
//! Copies notebooks that were executed top to bottom into `snapshot/`, or
//! executes them first with `--execute`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{ArgAction, Parser};

use nbsnapshot::batch::{ItemOutcome, Mode, RunOptions, run_batch};
use nbsnapshot::exit_codes;
use nbsnapshot::io::config::{CONFIG_FILE_NAME, load_config};
use nbsnapshot::io::executor::NbconvertExecutor;
use nbsnapshot::io::paths::SnapshotPaths;
use nbsnapshot::io::staleness::staleness_check;
use nbsnapshot::logging;

#[derive(Parser, Debug)]
#[command(
    name = "nbsnapshot",
    version,
    about = "Snapshot notebooks that were executed top to bottom"
)]
struct Cli {
    /// Execute the given notebooks instead of checking their execution order.
    #[arg(short, long)]
    execute: bool,

    /// Print diagnostics; repeat (-vv) to also show execution engine errors.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Rewrite snapshots even when they look up to date.
    #[arg(short, long)]
    force: bool,

    /// Config file. Defaults to `nbsnapshot.toml` in the current directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Notebooks to snapshot. Defaults to every notebook in the working directory.
    files: Vec<String>,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.execute {
            Mode::Execute
        } else {
            Mode::Check
        }
    }

    fn usage_error(&self) -> Option<&'static str> {
        if self.execute && self.files.is_empty() {
            return Some("--execute requires at least one notebook file");
        }
        None
    }
}

fn main() {
    let cli = Cli::parse();
    if let Some(message) = cli.usage_error() {
        eprintln!("error: {message}");
        std::process::exit(exit_codes::INVALID);
    }
    logging::init(cli.verbose);
    if let Err(err) = run(&cli) {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("read current directory")?;
    let config_path = match &cli.config {
        Some(path) if !path.exists() => bail!("missing config {}", path.display()),
        Some(path) => path.clone(),
        None => cwd.join(CONFIG_FILE_NAME),
    };
    let cfg = load_config(&config_path)?;
    let paths = SnapshotPaths::discover(&cwd, &cfg)?;

    let options = RunOptions {
        mode: cli.mode(),
        force: cli.force,
        date: Local::now().date_naive(),
    };
    let executor = NbconvertExecutor::new(&cfg.executor);
    let staleness = staleness_check(cfg.staleness, &paths);
    let show_engine_errors = cli.verbose >= 2;

    let report = run_batch(
        &paths,
        &cfg,
        &options,
        &cli.files,
        &executor,
        &*staleness,
        |file_name, outcome| print_item(file_name, outcome, show_engine_errors),
    )?;
    for line in report.render() {
        println!("{line}");
    }
    Ok(())
}

fn print_item(file_name: &str, outcome: &ItemOutcome, show_engine_errors: bool) {
    match outcome {
        ItemOutcome::Snapshotted | ItemOutcome::UpToDate => {}
        ItemOutcome::OutOfOrder(violation) => {
            println!("skip: {file_name} was not executed in order ({violation})");
        }
        ItemOutcome::ExecutionFailed(failure) => {
            println!("fail: {file_name} could not be executed ({failure})");
            if show_engine_errors && !failure.stderr.trim().is_empty() {
                eprintln!("{}", failure.stderr.trim_end());
            }
        }
    }
}
