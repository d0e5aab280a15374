//! Notebook snapshot tool.
//!
//! Checks that notebooks were executed top to bottom (or executes them) and
//! copies them, wrapped in a generated disclaimer, into a snapshot directory.
//! The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (order check, disclaimer cells,
//!   canonical JSON). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, file selection, staleness,
//!   notebook load/store, process execution). Isolated behind traits where
//!   tests need fakes.
//!
//! [`batch`] coordinates core logic with I/O for one CLI invocation and
//! [`report`] summarizes it.

pub mod batch;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod notebook;
pub mod report;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
