use std::ops::Deref;
use std::sync::Arc;

use serde::Deserialize;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct: String,
}

impl Question {
    pub fn new<P, O, C>(prompt: P, options: impl IntoIterator<Item = O>, correct: C) -> Self
    where
        P: Into<String>,
        O: Into<String>,
        C: Into<String>,
    {
        Self {
            prompt: prompt.into(),
            options: options.into_iter().map(Into::into).collect(),
            correct: correct.into(),
        }
    }

    /// Whether the correct answer is one of the listed options.
    pub fn has_correct_option(&self) -> bool {
        self.options.iter().any(|option| *option == self.correct)
    }
}

/// The ordered, read-only list of questions for a session.
///
/// Cloning is cheap; all clones share the same questions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Arc<[Question]>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions: questions.into(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

impl Deref for QuestionBank {
    type Target = [Question];

    fn deref(&self) -> &[Question] {
        &self.questions
    }
}

impl From<Vec<Question>> for QuestionBank {
    fn from(questions: Vec<Question>) -> Self {
        Self::new(questions)
    }
}
