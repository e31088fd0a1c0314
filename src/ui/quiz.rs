use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::{Feedback, Question};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(question) = app.quiz().current_question() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(area);

    render_progress(frame, chunks[0], app);
    render_prompt(frame, chunks[1], &question.prompt);

    match app.session().feedback() {
        Some(feedback) => {
            render_feedback(frame, chunks[2], feedback, question);
            render_controls(frame, chunks[3], "enter next question  ·  q quit");
        }
        None => {
            render_options(frame, chunks[2], &question.options, app.selected_option());
            render_controls(
                frame,
                chunks[3],
                "j/k navigate  ·  enter select  ·  1-9 answer  ·  q quit",
            );
        }
    }
}

fn render_progress(frame: &mut Frame, area: Rect, app: &App) {
    let progress = format!(
        "Question {} / {}",
        app.quiz().current_question_number(),
        app.quiz().total_questions()
    );
    let widget = Paragraph::new(progress)
        .alignment(Alignment::Right)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

fn render_prompt(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_options(frame: &mut Frame, area: Rect, options: &[String], selected: usize) {
    let mut lines: Vec<Line> = Vec::with_capacity(options.len() * 2);

    for (index, option) in options.iter().enumerate() {
        let is_selected = index == selected;
        let style = if is_selected {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_selected { ">" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", index + 1), style),
            Span::styled(option.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_feedback(frame: &mut Frame, area: Rect, feedback: Feedback, question: &Question) {
    let color = match feedback {
        Feedback::Correct => Color::Green,
        Feedback::Incorrect => Color::Red,
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            feedback.text(),
            Style::default().fg(color).bold(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Answer: ", Style::default().fg(Color::DarkGray)),
            Span::styled(question.correct.as_str(), Style::default().fg(Color::White)),
        ]),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, hint: &str) {
    let widget = Paragraph::new(hint)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
