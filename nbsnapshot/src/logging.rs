//! Diagnostic tracing for the snapshot CLI.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: diagnostics enabled by `-v` or `RUST_LOG`,
//!   written to stderr.
//! - **Product output (`main`)**: per-notebook messages and the batch report
//!   on stdout. Always printed, unaffected by the filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive for a `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn,nbsnapshot=debug",
        _ => "warn,nbsnapshot=trace",
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise the filter follows the
/// `-v` count. Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=nbsnapshot=trace nbsnapshot analysis.ipynb
/// ```
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
