//! Tracing subscriber bootstrap for binaries and tests.

use std::{fs::File, path::Path, sync::Mutex};

use tracing_subscriber::EnvFilter;

use crate::core::error::{Error, Result};

/// Install a subscriber that writes to stderr, filtered by `RUST_LOG`.
/// Suitable for tests and non-interactive runs; a fullscreen UI should
/// prefer [`init_file`].
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Install a subscriber that appends to a log file, filtered by
/// `RUST_LOG`. This keeps tracing output off the terminal the UI owns.
pub fn init_file(path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(|e| Error::Internal(e.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| Error::Internal(e.to_string()))
}
