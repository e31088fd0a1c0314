use std::path::PathBuf;

use crate::machine::{QuizMachine, TransitionError};
use crate::models::{Phase, QuestionBank, QuizSession};
use crate::report::{ExportError, ExportReport};

/// Progress of the most recent report export, shown on the score screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportStatus {
    Idle,
    InFlight,
    Saved(PathBuf),
    Failed(String),
}

/// Presentation state wrapped around a [`QuizMachine`].
pub struct App {
    quiz: QuizMachine,
    selected_option: usize,
    result_scroll: usize,
    export_status: ExportStatus,
    generation: u64,
}

impl App {
    pub fn with_questions(bank: QuestionBank) -> Self {
        Self {
            quiz: QuizMachine::new(bank),
            selected_option: 0,
            result_scroll: 0,
            export_status: ExportStatus::Idle,
            generation: 0,
        }
    }

    pub fn quiz(&self) -> &QuizMachine {
        &self.quiz
    }

    pub fn session(&self) -> &QuizSession {
        self.quiz.session()
    }

    pub fn phase(&self) -> Phase {
        self.quiz.session().phase()
    }

    pub fn selected_option(&self) -> usize {
        self.selected_option
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn export_status(&self) -> &ExportStatus {
        &self.export_status
    }

    fn option_count(&self) -> usize {
        self.quiz
            .current_question()
            .map_or(0, |question| question.options.len())
    }

    pub fn select_next_option(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.selected_option = (self.selected_option + 1) % count;
        }
    }

    pub fn select_previous_option(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.selected_option = (self.selected_option + count - 1) % count;
        }
    }

    /// Submit the highlighted option.
    pub fn submit_selected(&mut self) -> Result<(), TransitionError> {
        self.submit_option(self.selected_option)
    }

    /// Submit the option at `index`; out-of-range indexes are ignored.
    pub fn submit_option(&mut self, index: usize) -> Result<(), TransitionError> {
        let Some(chosen) = self
            .quiz
            .current_question()
            .and_then(|question| question.options.get(index))
            .cloned()
        else {
            return Ok(());
        };
        self.selected_option = index;
        self.quiz.submit_answer(chosen)
    }

    pub fn advance(&mut self) -> Result<(), TransitionError> {
        self.quiz.advance()?;
        self.selected_option = 0;
        Ok(())
    }

    pub fn restart(&mut self) {
        self.quiz.restart();
        self.selected_option = 0;
        self.result_scroll = 0;
        self.export_status = ExportStatus::Idle;
        self.generation += 1;
    }

    pub fn scroll_results_down(&mut self) {
        let max_scroll = self.session().history().len().saturating_sub(1);
        self.result_scroll = (self.result_scroll + 1).min(max_scroll);
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    /// Mark an export as in flight if the score screen is showing.
    ///
    /// Returns the tag to hand back to [`App::finish_export`].
    pub fn begin_export(&mut self) -> Option<u64> {
        if !self.session().is_finished() {
            return None;
        }
        self.export_status = ExportStatus::InFlight;
        Some(self.generation)
    }

    /// Record an export outcome, unless the session was restarted since the
    /// export began.
    pub fn finish_export(&mut self, generation: u64, result: Result<ExportReport, ExportError>) {
        if generation != self.generation {
            return;
        }
        self.export_status = match result {
            Ok(report) => ExportStatus::Saved(report.path),
            Err(err) => ExportStatus::Failed(err.to_string()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::Question;
    use crate::report::RegionHandle;

    fn app() -> App {
        App::with_questions(QuestionBank::new(vec![
            Question::new("Q1", ["A", "B", "C"], "C"),
            Question::new("Q2", ["D", "E"], "D"),
        ]))
    }

    fn finish(app: &mut App) {
        app.submit_option(2).unwrap();
        app.advance().unwrap();
        app.submit_option(0).unwrap();
        app.advance().unwrap();
    }

    #[test]
    fn test_option_selection_wraps() {
        let mut app = app();
        app.select_previous_option();
        assert_eq!(app.selected_option(), 2);
        app.select_next_option();
        assert_eq!(app.selected_option(), 0);
    }

    #[test]
    fn test_submit_selected_uses_option_text() {
        let mut app = app();
        app.select_next_option();
        app.select_next_option();
        app.submit_selected().unwrap();

        assert_eq!(app.session().score(), 1);
        assert_eq!(app.session().history()[0].chosen, "C");
    }

    #[test]
    fn test_submit_out_of_range_is_ignored() {
        let mut app = app();
        app.submit_option(7).unwrap();
        assert_eq!(app.phase(), Phase::Answering);
        assert!(app.session().history().is_empty());
    }

    #[test]
    fn test_advance_resets_selection() {
        let mut app = app();
        app.submit_option(1).unwrap();
        app.advance().unwrap();
        assert_eq!(app.selected_option(), 0);
        assert_eq!(app.session().current_index(), 1);
    }

    #[test]
    fn test_results_scroll_is_bounded() {
        let mut app = app();
        finish(&mut app);
        app.scroll_results_down();
        app.scroll_results_down();
        app.scroll_results_down();
        assert_eq!(app.result_scroll(), 1);
        app.scroll_results_up();
        app.scroll_results_up();
        assert_eq!(app.result_scroll(), 0);
    }

    #[test]
    fn test_begin_export_needs_finished_session() {
        let mut app = app();
        assert!(app.begin_export().is_none());
        assert_eq!(app.export_status(), &ExportStatus::Idle);

        finish(&mut app);
        let generation = app.begin_export().unwrap();
        assert_eq!(app.export_status(), &ExportStatus::InFlight);

        app.finish_export(
            generation,
            Err(ExportError::TargetMissing(RegionHandle::new("x"))),
        );
        assert!(matches!(app.export_status(), ExportStatus::Failed(_)));
    }

    #[test]
    fn test_export_finishing_after_restart_is_dropped() {
        let mut app = app();
        finish(&mut app);
        let stale = app.begin_export().unwrap();

        app.restart();
        finish(&mut app);
        app.finish_export(stale, Err(ExportError::NotFinished));
        assert_eq!(app.export_status(), &ExportStatus::Idle);

        let current = app.begin_export().unwrap();
        assert_ne!(current, stale);
        app.finish_export(current, Err(ExportError::NotFinished));
        assert!(matches!(app.export_status(), ExportStatus::Failed(_)));
    }

    #[test]
    fn test_restart_clears_presentation_state() {
        let mut app = app();
        finish(&mut app);
        app.scroll_results_down();
        let generation = app.begin_export().unwrap();
        app.finish_export(generation, Err(ExportError::NotFinished));

        app.restart();
        assert_eq!(app.phase(), Phase::Answering);
        assert_eq!(app.result_scroll(), 0);
        assert_eq!(app.export_status(), &ExportStatus::Idle);
        assert!(app.begin_export().is_none());
    }
}
