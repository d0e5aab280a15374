//! I/O helpers for snapshot runs.

pub mod config;
pub mod executor;
pub mod notebook_store;
pub mod paths;
pub mod process;
pub mod select;
pub mod staleness;
