use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::QuizError;

/// Send log output to `path`, filtered by `RUST_LOG` (default `info`).
///
/// The terminal belongs to the UI, so nothing is logged to stdout or stderr.
pub fn init(path: &Path) -> Result<(), QuizError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| QuizError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(QuizError::Logging)
}
