use std::path::PathBuf;

pub const DEFAULT_QUESTIONS_PATH: &str = "questions.json";
pub const DEFAULT_LOG_FILE: &str = "quizcard.log";

/// Runtime settings, filled in from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// JSON file holding the question bank.
    pub questions: PathBuf,
    /// Directory the score report is saved into.
    pub output_dir: PathBuf,
    /// Where log output goes while the terminal UI is running.
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            questions: PathBuf::from(DEFAULT_QUESTIONS_PATH),
            output_dir: PathBuf::from("."),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}
