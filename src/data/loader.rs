use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Question, QuestionBank};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read a question bank from a JSON array of questions.
pub fn load_questions_from_json<P: AsRef<Path>>(path: P) -> Result<QuestionBank, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let bank = parse_questions(&json_content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), questions = bank.len(), "loaded question bank");
    Ok(bank)
}

/// Parse a question bank from JSON text.
///
/// Questions whose correct answer is missing from their options are kept;
/// they can never be answered correctly, so a warning is logged.
pub fn parse_questions(json: &str) -> Result<QuestionBank, serde_json::Error> {
    let questions: Vec<Question> = serde_json::from_str(json)?;

    for (index, question) in questions.iter().enumerate() {
        if !question.has_correct_option() {
            warn!(
                question = index + 1,
                correct = %question.correct,
                "correct answer is not one of the options"
            );
        }
    }

    Ok(QuestionBank::new(questions))
}
