use std::fmt;

/// Stage of the quiz a session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for an answer to the current question.
    Answering,
    /// Showing whether the last answer was right.
    FeedbackShown,
    /// All questions answered; the score screen is shown.
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Answering => "answering",
            Phase::FeedbackShown => "feedback shown",
            Phase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Verdict shown after an answer is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect,
}

impl Feedback {
    pub fn from_outcome(is_correct: bool) -> Self {
        if is_correct {
            Feedback::Correct
        } else {
            Feedback::Incorrect
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Feedback::Correct => "Correct!",
            Feedback::Incorrect => "Incorrect.",
        }
    }
}

/// Outcome of one answered question. Never changed once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredRecord {
    pub prompt: String,
    pub chosen: String,
    pub correct: String,
    pub is_correct: bool,
}

/// Everything that changes while a quiz is taken.
///
/// Only the transitions in [`crate::machine`] produce new values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    pub(crate) current_index: usize,
    pub(crate) history: Vec<AnsweredRecord>,
    pub(crate) score: usize,
    pub(crate) feedback: Option<Feedback>,
    pub(crate) phase: Phase,
}

impl QuizSession {
    /// Initial session for a bank holding `total` questions.
    ///
    /// An empty bank has nothing to ask, so the session starts finished.
    pub fn start(total: usize) -> Self {
        Self {
            current_index: 0,
            history: Vec::new(),
            score: 0,
            feedback: None,
            phase: if total == 0 {
                Phase::Finished
            } else {
                Phase::Answering
            },
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn history(&self) -> &[AnsweredRecord] {
        &self.history
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Score as a percentage of `total`, or 0 when there are no questions.
    pub fn percentage(&self, total: usize) -> f64 {
        if total > 0 {
            (self.score as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}
