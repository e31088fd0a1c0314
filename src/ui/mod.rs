mod quiz;
mod result;

use ratatui::{prelude::*, widgets::Block};

use crate::app::App;
use crate::models::Phase;

pub use result::report_canvas;

/// Draw the screen for the current phase.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.phase() {
        Phase::Answering | Phase::FeedbackShown => quiz::render(frame, area, app),
        Phase::Finished => result::render(frame, area, app),
    }
}
