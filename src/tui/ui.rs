//! Rendering for the home and counter screens.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::{App, Overlay, Screen};
use crate::db::KeyValueStore;
use crate::display;
use crate::guide;
use crate::timer::{Phase, TrackingTimer, KICK_TARGET};

const ACCENT: Color = Color::Rgb(123, 97, 255);
const DONE: Color = Color::Rgb(76, 175, 80);

pub fn draw<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Keys
        ])
        .split(frame.area());

    let title = match app.screen {
        Screen::Home => "DFM (Kick counter)",
        Screen::Counter => "Record DFM",
    };
    let header = Paragraph::new(format!(" {} ", title))
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(header, chunks[0]);

    match (app.screen, app.timer.as_ref()) {
        (Screen::Counter, Some(timer)) => draw_counter(frame, chunks[1], timer),
        _ => draw_home(frame, chunks[1], app),
    }

    let keys = match app.screen {
        Screen::Home => " [r] record  [↑↓] select  [d] delete  [?] guide  [q] quit",
        Screen::Counter => " [space] kick  [s] save  [h] not enough kicks?  [?] guide  [esc] back",
    };
    frame.render_widget(
        Paragraph::new(keys).style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );

    if let Some(overlay) = &app.overlay {
        draw_overlay(frame, overlay);
    }
}

fn draw_home<S: KeyValueStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let block = Block::default().borders(Borders::ALL).title(" Past records ");

    if app.sessions.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("No tracking sessions yet").bold(),
            Line::from(""),
            Line::from("Start tracking your baby's movements to see your history here"),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .sessions
        .iter()
        .map(|session| {
            let (date, time, duration) = display::history_row(session);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(date, Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw("  "),
                    Span::styled(duration, Style::default().fg(ACCENT)),
                ]),
                Line::from(Span::styled(
                    format!("{}  ·  {}/{} kicks", time, session.kick_count, KICK_TARGET),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_counter(frame: &mut Frame, area: Rect, timer: &TrackingTimer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status
            Constraint::Length(3), // Clock
            Constraint::Min(5),    // Count
        ])
        .split(area);

    let (headline, sub) = display::status_lines(timer);
    frame.render_widget(
        Paragraph::new(vec![Line::from(headline).bold(), Line::from(sub)])
            .alignment(Alignment::Center),
        chunks[0],
    );

    frame.render_widget(
        Paragraph::new(display::format_clock(timer.elapsed_secs()))
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::BOLD)),
        chunks[1],
    );

    let complete = timer.phase() == Phase::Complete;
    let count_style = if complete {
        Style::default().fg(DONE).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    };
    let button = if complete { "✓ Complete" } else { "Tap to Count" };
    let count = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{} / {}", timer.kick_count(), KICK_TARGET),
            count_style,
        )),
        Line::from(""),
        Line::from(button),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(count, centered_rect(40, 100, chunks[2]));
}

fn draw_overlay(frame: &mut Frame, overlay: &Overlay) {
    let (title, lines, hint): (String, Vec<String>, &str) = match overlay {
        Overlay::Guide => (guide::GUIDE_TITLE.to_string(), guide::steps(), "any key to close"),
        Overlay::LowKicks => (
            guide::LOW_KICKS_TITLE.to_string(),
            guide::low_kicks_advice(),
            "any key to close",
        ),
        Overlay::ConfirmDiscard => (
            "Discard Session?".to_string(),
            vec![
                "Are you sure you want to go back? Your current tracking session will be lost."
                    .to_string(),
            ],
            "[s] Stay  [d] Discard",
        ),
        Overlay::ConfirmDelete(id) => (
            "Delete Session?".to_string(),
            vec![format!("Session {} will be removed from your history.", id)],
            "[n] Keep  [y] Delete",
        ),
        Overlay::Notice { title, body, .. } => (title.clone(), vec![body.clone()], "any key"),
    };

    let area = centered_rect(70, 50, frame.area());
    frame.render_widget(Clear, area);

    let mut text: Vec<Line> = lines.into_iter().map(Line::from).collect();
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));

    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .title(format!(" {} ", title)),
        );
    frame.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
