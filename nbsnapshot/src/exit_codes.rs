//! Stable exit codes for the snapshot CLI.

/// Batch finished, including batches where individual notebooks were skipped
/// or failed to execute.
pub const OK: i32 = 0;
/// Usage error (`--execute` without files) or a fatal config/file-system error.
pub const INVALID: i32 = 1;
