use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Padding, Paragraph, Row, Table, Widget},
};

use crate::app::{App, ExportStatus};
use crate::models::AnsweredRecord;
use crate::report::{Canvas, RegionHandle, RegionMap, SCORE_REGION};

const ANSWER_PREVIEW_LENGTH: usize = 40;
const SUMMARY_HEIGHT: u16 = 6;
const TABLE_HEADER_HEIGHT: u16 = 1;
const REPORT_MIN_WIDTH: u16 = 60;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(SUMMARY_HEIGHT),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    frame.render_widget(score_summary(app), chunks[0]);
    frame.render_widget(
        answer_table(app.session().history(), app.result_scroll()),
        chunks[1],
    );
    render_export_status(frame, chunks[2], app.export_status());
    render_controls(frame, chunks[3]);
}

/// Draw the score summary and the whole answer table off screen.
///
/// The buffer is tall enough for every answered question, independent of the
/// terminal height and the current scroll position.
pub fn report_canvas(app: &App, width: u16) -> Canvas {
    let history = app.session().history();
    let rows = u16::try_from(history.len()).unwrap_or(u16::MAX);
    let height = SUMMARY_HEIGHT
        .saturating_add(TABLE_HEADER_HEIGHT)
        .saturating_add(rows);
    let area = Rect::new(0, 0, width.max(REPORT_MIN_WIDTH), height);

    let mut buffer = Buffer::empty(area);
    let [summary, table] =
        Layout::vertical([Constraint::Length(SUMMARY_HEIGHT), Constraint::Fill(1)]).areas(area);
    Widget::render(score_summary(app), summary, &mut buffer);
    Widget::render(answer_table(history, 0), table, &mut buffer);

    let mut regions = RegionMap::new();
    regions.register(RegionHandle::new(SCORE_REGION), area);
    Canvas::capture(&buffer, regions)
}

fn get_grade_color(percentage: f64) -> Color {
    match percentage as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn score_summary(app: &App) -> Paragraph<'static> {
    let session = app.session();
    let total = app.quiz().total_questions();
    let percentage = session.percentage(total);
    let grade_color = get_grade_color(percentage);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled("SCORE", Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / {}  ({:.0}%)", session.score(), total, percentage),
            Style::default().fg(grade_color).bold(),
        )),
        Line::from(""),
    ];

    Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    )
}

fn answer_table(history: &[AnsweredRecord], scroll: usize) -> Table<'static> {
    let header = Row::new(["Question", "Your answer", "Correct", "Result"])
        .style(Style::default().fg(Color::DarkGray).bold());

    let rows = history.iter().skip(scroll).map(|record| {
        let (verdict, color) = if record.is_correct {
            ("OK", Color::Green)
        } else {
            ("NG", Color::Red)
        };
        Row::new(vec![
            Cell::from(truncate(&record.prompt)),
            Cell::from(truncate(&record.chosen)),
            Cell::from(truncate(&record.correct)),
            Cell::from(verdict).style(Style::default().fg(color).bold()),
        ])
    });

    let widths = [
        Constraint::Percentage(46),
        Constraint::Percentage(22),
        Constraint::Percentage(22),
        Constraint::Percentage(10),
    ];
    Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().padding(Padding::horizontal(1)))
}

fn truncate(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > ANSWER_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(ANSWER_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn render_export_status(frame: &mut Frame, area: Rect, status: &ExportStatus) {
    let line = match status {
        ExportStatus::Idle => return,
        ExportStatus::InFlight => Line::from("Creating report...".fg(Color::Yellow)),
        ExportStatus::Saved(path) => {
            Line::from(format!("Report saved to {}", path.display()).fg(Color::Green))
        }
        ExportStatus::Failed(reason) => {
            Line::from(format!("Report failed: {}", reason).fg(Color::Red))
        }
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  p save report  ·  r restart  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::backend::TestBackend;

    use crate::models::{Question, QuestionBank};
    use crate::report::{Rasterize, CELL_HEIGHT, CELL_WIDTH};

    fn finished_app(questions: usize) -> App {
        let bank = (1..=questions)
            .map(|n| Question::new(format!("Question number {n:02}"), ["yes"], "yes"))
            .collect::<Vec<_>>();
        let mut app = App::with_questions(QuestionBank::new(bank));
        while !app.session().is_finished() {
            app.submit_option(0).unwrap();
            app.advance().unwrap();
        }
        app
    }

    fn buffer_text(buffer: &Buffer) -> String {
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .filter_map(|x| buffer.cell((x, y)).map(|cell| cell.symbol().to_string()))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_report_holds_every_record_regardless_of_scroll() {
        let mut app = finished_app(20);
        app.scroll_results_down();
        app.scroll_results_down();

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, area, &app)
            })
            .unwrap();

        let canvas = report_canvas(&app, 80);
        let handle = RegionHandle::new(SCORE_REGION);
        let area = canvas.resolve(&handle).unwrap();
        assert_eq!(area, Rect::new(0, 0, 80, SUMMARY_HEIGHT + TABLE_HEADER_HEIGHT + 20));

        let text = buffer_text(canvas.buffer());
        assert!(text.contains("20 / 20"));
        for n in 1..=20 {
            let prompt = format!("Question number {n:02}");
            assert!(text.contains(&prompt), "report is missing {prompt}");
        }

        let image = canvas.rasterize(&handle).unwrap();
        assert_eq!(image.width(), 80 * CELL_WIDTH);
        assert_eq!(image.height(), u32::from(area.height) * CELL_HEIGHT);
    }

    #[test]
    fn test_report_has_minimum_width() {
        let app = finished_app(1);
        let canvas = report_canvas(&app, 10);
        assert_eq!(canvas.buffer().area.width, REPORT_MIN_WIDTH);
    }

    #[test]
    fn test_report_for_empty_session() {
        let app = App::with_questions(QuestionBank::default());
        let canvas = report_canvas(&app, 80);
        assert_eq!(canvas.buffer().area.height, SUMMARY_HEIGHT + TABLE_HEADER_HEIGHT);
        assert!(buffer_text(canvas.buffer()).contains("0 / 0"));
    }

    #[test]
    fn test_grade_color() {
        assert_eq!(get_grade_color(100.0), Color::Green);
        assert_eq!(get_grade_color(75.0), Color::Cyan);
        assert_eq!(get_grade_color(50.0), Color::Yellow);
        assert_eq!(get_grade_color(0.0), Color::Red);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short"), "short");
        let long = "x".repeat(ANSWER_PREVIEW_LENGTH + 5);
        assert_eq!(truncate(&long).chars().count(), ANSWER_PREVIEW_LENGTH + 3);
    }
}
