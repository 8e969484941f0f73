use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::Line,
    widgets::canvas::{Canvas, Circle},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::state::{key_hint, status_line, UiState};
use crate::model::{CIRCLE_CENTER, MAX_RADIUS};

const CANVAS_SIZE: f64 = 2.0 * CIRCLE_CENTER;

pub fn draw_breathe(area: Rect, f: &mut Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Calming prompt
                Constraint::Min(8),    // Circle
                Constraint::Length(6), // Status + keys
            ]
            .as_ref(),
        )
        .split(area);

    let prompt = Paragraph::new(Line::from(state.prompt.as_str()))
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(prompt, rows[0]);

    draw_circle(rows[1], f, state);
    draw_status(rows[2], f, state);
}

fn draw_circle(area: Rect, f: &mut Frame, state: &UiState) {
    let (cx, cy) = state.bounds.center();
    let radius = state.bounds.radius();
    let color = state.session_color();
    let title = match state.phase {
        Some(phase) => phase.cue(),
        None => "Breathe",
    };

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(symbols::Marker::Braille)
        .x_bounds([0.0, CANVAS_SIZE])
        .y_bounds([0.0, CANVAS_SIZE])
        .paint(move |ctx| {
            ctx.draw(&Circle {
                x: cx,
                y: cy,
                radius,
                color,
            });
            // Full-size guide ring.
            ctx.draw(&Circle {
                x: cx,
                y: cy,
                radius: f64::from(MAX_RADIUS),
                color: Color::DarkGray,
            });
        });
    f.render_widget(canvas, area);
}

fn draw_status(area: Rect, f: &mut Frame, state: &UiState) {
    let mut lines = vec![
        status_line("State", state.session.label().to_string(), state.session_color()),
        status_line("Radius", state.radius.to_string(), Color::White),
    ];
    if !state.info.is_empty() {
        lines.push(status_line("Info", state.info.clone(), Color::White));
    }
    if let Some(w) = state.sound_warning.as_ref() {
        lines.push(status_line("Sound", w.clone(), Color::Red));
    }

    let mut keys = Vec::new();
    keys.extend(key_hint("s", "start/resume"));
    keys.extend(key_hint("p", "pause"));
    keys.extend(key_hint("x", "stop"));
    keys.extend(key_hint("tab", "notes"));
    keys.extend(key_hint("q", "quit"));
    lines.push(Line::from(keys));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Session"));
    f.render_widget(p, area);
}
