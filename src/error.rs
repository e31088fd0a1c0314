use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::data::LoadError;

/// Error type for quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Error loading questions from file.
    #[error("failed to load questions: {0}")]
    Load(#[from] LoadError),
    /// IO error while driving the terminal.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The log file could not be opened.
    #[error("failed to open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A global logger was already installed.
    #[error("failed to initialize logging: {0}")]
    Logging(#[source] Box<dyn std::error::Error + Send + Sync>),
}
