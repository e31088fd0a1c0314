//! # quizcard
//!
//! A terminal quiz that scores a fixed question bank and saves the score
//! screen as a one-page PDF report.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quizcard::{Config, Quiz, QuizError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     let quiz = Quiz::from_config(&Config::default())?;
//!     quiz.run().await
//! }
//! ```
//!
//! The state machine and the exporter can also be driven without a terminal:
//!
//! ```rust
//! use quizcard::{Phase, Question, QuestionBank, QuizMachine};
//!
//! let bank = QuestionBank::new(vec![Question::new("2 + 2?", ["3", "4"], "4")]);
//! let mut quiz = QuizMachine::new(bank);
//! quiz.submit_answer("4").unwrap();
//! quiz.advance().unwrap();
//! assert_eq!(quiz.session().phase(), Phase::Finished);
//! assert_eq!(quiz.session().score(), 1);
//! ```

mod app;
mod config;
mod data;
mod error;
pub mod logging;
pub mod machine;
mod models;
pub mod report;
pub mod terminal;
mod ui;

use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tokio::sync::mpsc;
use tracing::{debug, info};

pub use app::{App, ExportStatus};
pub use config::{Config, DEFAULT_LOG_FILE, DEFAULT_QUESTIONS_PATH};
pub use data::{load_questions_from_json, parse_questions, LoadError};
pub use error::QuizError;
pub use machine::{QuizEvent, QuizMachine, TransitionError};
pub use models::{AnsweredRecord, Feedback, Phase, Question, QuestionBank, QuizSession};
pub use report::{ExportError, ExportReport, ReportExporter};

use report::{RegionHandle, SCORE_REGION};

/// Export outcome tagged with the session generation it was started in.
type ExportResult = (u64, Result<ExportReport, ExportError>);

/// A quiz instance that can be run in the terminal.
pub struct Quiz {
    app: App,
    exporter: ReportExporter,
}

impl Quiz {
    /// Create a new quiz over `bank`, saving reports into `output_dir`.
    pub fn new(bank: QuestionBank, output_dir: impl AsRef<Path>) -> Self {
        Self {
            app: App::with_questions(bank),
            exporter: ReportExporter::new(output_dir.as_ref()),
        }
    }

    /// Load a quiz from a JSON file.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use quizcard::Quiz;
    ///
    /// let quiz = Quiz::from_json("questions.json", ".").expect("Failed to load quiz");
    /// ```
    pub fn from_json<P: AsRef<Path>>(path: P, output_dir: impl AsRef<Path>) -> Result<Self, QuizError> {
        let bank = load_questions_from_json(path)?;
        Ok(Self::new(bank, output_dir))
    }

    pub fn from_config(config: &Config) -> Result<Self, QuizError> {
        Self::from_json(&config.questions, &config.output_dir)
    }

    /// Run the quiz in the terminal.
    ///
    /// This takes over the terminal and returns when the user quits.
    /// Report exports run in the background while the UI keeps going.
    pub async fn run(mut self) -> Result<(), QuizError> {
        info!(
            questions = self.app.quiz().total_questions(),
            output = %self.exporter.output_path().display(),
            "starting quiz"
        );
        let mut guard = terminal::init()?;
        run_event_loop(guard.terminal(), &mut self.app, &self.exporter).await
    }

    /// Get a reference to the underlying app for custom handling.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the underlying app for custom handling.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn exporter(&self) -> &ReportExporter {
        &self.exporter
    }
}

async fn run_event_loop(
    terminal: &mut terminal::AppTerminal,
    app: &mut App,
    exporter: &ReportExporter,
) -> Result<(), QuizError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ExportResult>();

    loop {
        while let Ok((generation, result)) = rx.try_recv() {
            app.finish_export(generation, result);
        }

        let frame = terminal.draw(|frame| ui::render(frame, app))?;
        let width = frame.area.width;

        if !event::poll(Duration::from_millis(100))? {
            tokio::task::yield_now().await;
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match handle_input(app, key.code) {
                Action::Quit => break,
                Action::Export => spawn_export(app, exporter, &tx, width),
                Action::None => {}
            }
        }
    }

    info!("quiz closed");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Export,
    Quit,
}

fn handle_input(app: &mut App, key: KeyCode) -> Action {
    if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
        return Action::Quit;
    }

    match app.phase() {
        Phase::Answering => handle_answering_input(app, key),
        Phase::FeedbackShown => handle_feedback_input(app, key),
        Phase::Finished => handle_result_input(app, key),
    }
}

// Rejected transitions are logged by the state machine and need no UI.

fn handle_answering_input(app: &mut App, key: KeyCode) -> Action {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            let _ = app.submit_selected();
        }
        KeyCode::Char(digit @ '1'..='9') => {
            let index = digit as usize - '1' as usize;
            let _ = app.submit_option(index);
        }
        _ => {}
    }
    Action::None
}

fn handle_feedback_input(app: &mut App, key: KeyCode) -> Action {
    if matches!(key, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n')) {
        let _ = app.advance();
    }
    Action::None
}

fn handle_result_input(app: &mut App, key: KeyCode) -> Action {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.restart(),
        KeyCode::Char('p') | KeyCode::Char('P') => return Action::Export,
        _ => {}
    }
    Action::None
}

/// Start a background export of the score report, drawn `width` cells wide.
///
/// Overlapping exports are not prevented; each one rewrites the same file.
fn spawn_export(
    app: &mut App,
    exporter: &ReportExporter,
    tx: &mpsc::UnboundedSender<ExportResult>,
    width: u16,
) {
    let Some(generation) = app.begin_export() else {
        debug!("no score screen to export yet");
        return;
    };

    let canvas = ui::report_canvas(app, width);
    let exporter = exporter.clone();
    let session = app.session().clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = exporter
            .export(canvas, RegionHandle::new(SCORE_REGION), &session)
            .await;
        let _ = tx.send((generation, result));
    });
}
