//! Quiz state machine.
//!
//! Transitions are a pure function of the question bank, the current session
//! and an event. [`QuizMachine`] wraps that function for callers that want to
//! mutate a session in place.

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{AnsweredRecord, Feedback, Phase, Question, QuestionBank, QuizSession};

/// Input that drives a session forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    /// Answer the current question with the given option text.
    SubmitAnswer(String),
    /// Leave the feedback screen.
    Advance,
    /// Start over from the first question.
    Restart,
}

impl QuizEvent {
    fn name(&self) -> &'static str {
        match self {
            QuizEvent::SubmitAnswer(_) => "submit_answer",
            QuizEvent::Advance => "advance",
            QuizEvent::Restart => "restart",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{event} is not allowed while {phase}")]
    PreconditionViolation { event: &'static str, phase: Phase },
}

/// Compute the session that follows `session` after `event`.
///
/// On error the caller keeps its current session; nothing is modified here.
pub fn reduce(
    bank: &QuestionBank,
    session: &QuizSession,
    event: &QuizEvent,
) -> Result<QuizSession, TransitionError> {
    let next = match event {
        QuizEvent::SubmitAnswer(chosen) => submit(bank, session, chosen),
        QuizEvent::Advance => advance(bank, session),
        QuizEvent::Restart => Ok(QuizSession::start(bank.len())),
    };
    next.map_err(|phase| TransitionError::PreconditionViolation {
        event: event.name(),
        phase,
    })
}

fn submit(bank: &QuestionBank, session: &QuizSession, chosen: &str) -> Result<QuizSession, Phase> {
    if session.phase != Phase::Answering {
        return Err(session.phase);
    }
    let question = bank.get(session.current_index).ok_or(session.phase)?;

    // Exact text comparison; option strings are not normalized.
    let is_correct = chosen == question.correct;

    let mut next = session.clone();
    next.history.push(AnsweredRecord {
        prompt: question.prompt.clone(),
        chosen: chosen.to_string(),
        correct: question.correct.clone(),
        is_correct,
    });
    if is_correct {
        next.score += 1;
    }
    next.feedback = Some(Feedback::from_outcome(is_correct));
    next.phase = Phase::FeedbackShown;
    Ok(next)
}

fn advance(bank: &QuestionBank, session: &QuizSession) -> Result<QuizSession, Phase> {
    if session.phase != Phase::FeedbackShown {
        return Err(session.phase);
    }

    let mut next = session.clone();
    next.feedback = None;
    if session.current_index + 1 < bank.len() {
        next.current_index += 1;
        next.phase = Phase::Answering;
    } else {
        next.phase = Phase::Finished;
    }
    Ok(next)
}

/// A question bank paired with the session being played over it.
#[derive(Debug, Clone)]
pub struct QuizMachine {
    bank: QuestionBank,
    session: QuizSession,
}

impl QuizMachine {
    pub fn new(bank: QuestionBank) -> Self {
        let session = QuizSession::start(bank.len());
        Self { bank, session }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn total_questions(&self) -> usize {
        self.bank.len()
    }

    /// The question at the cursor, if the bank has one there.
    pub fn current_question(&self) -> Option<&Question> {
        self.bank.get(self.session.current_index)
    }

    /// 1-based number of the current question.
    pub fn current_question_number(&self) -> usize {
        self.session.current_index + 1
    }

    /// Apply `event`, keeping the current session if it is rejected.
    pub fn apply(&mut self, event: QuizEvent) -> Result<(), TransitionError> {
        match reduce(&self.bank, &self.session, &event) {
            Ok(next) => {
                debug!(
                    event = event.name(),
                    from = %self.session.phase,
                    to = %next.phase,
                    index = next.current_index,
                    score = next.score,
                    "quiz transition"
                );
                self.session = next;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "rejected quiz transition");
                Err(err)
            }
        }
    }

    pub fn submit_answer(&mut self, chosen: impl Into<String>) -> Result<(), TransitionError> {
        self.apply(QuizEvent::SubmitAnswer(chosen.into()))
    }

    pub fn advance(&mut self) -> Result<(), TransitionError> {
        self.apply(QuizEvent::Advance)
    }

    pub fn restart(&mut self) {
        self.session = QuizSession::start(self.bank.len());
        debug!(phase = %self.session.phase, "quiz restarted");
    }
}
