use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::state::{key_hint, UiState, TAB_NOTES};

pub fn draw_notes(area: Rect, f: &mut Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)].as_ref())
        .split(area);

    draw_input(rows[0], f, state);
    draw_list(rows[1], f, state);
}

fn draw_input(area: Rect, f: &mut Frame, state: &UiState) {
    let (title, border) = if state.draft_editing {
        (
            "Write your notes about your panic attack (Enter: save, Esc: cancel)",
            Style::default().fg(Color::Yellow),
        )
    } else {
        ("Write your notes about your panic attack (n: edit)", Style::default())
    };
    let mut text = state.draft.clone();
    if state.draft_editing {
        text.push('▏');
    }
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title),
        );
    f.render_widget(p, area);
}

fn draw_list(area: Rect, f: &mut Frame, state: &UiState) {
    let mut lines: Vec<Line> = Vec::new();

    // Borders and the two header lines.
    let max_items = (area.height as usize).saturating_sub(4).max(1);

    let total = state.notes.len();
    let current = state.notes_selected.map(|i| i + 1).unwrap_or(0);
    let mut header = vec![Span::raw(format!("Notes ({current}/{total}) - "))];
    header.extend(key_hint("↑/↓/j/k", "select"));
    header.extend(key_hint("d", "delete"));
    header.extend(key_hint("r", "refresh"));
    header.extend(key_hint("e", "export JSON"));
    lines.push(Line::from(header));

    if state.info.is_empty() {
        lines.push(Line::from(""));
    } else {
        lines.push(Line::from(vec![
            Span::styled("Info: ", Style::default().fg(Color::Gray)),
            Span::raw(state.info.as_str()),
        ]));
    }

    if state.notes.is_empty() {
        lines.push(Line::from(Span::styled(
            "No notes yet.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let offset = state.visible_offset(max_items);
    for (idx, note) in state.notes.iter().enumerate().skip(offset).take(max_items) {
        let selected = state.tab == TAB_NOTES && state.notes_selected == Some(idx);
        let line = if selected {
            Line::from(note.to_line()).style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Line::from(vec![
                Span::styled(format!("{} | ", note.id), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{} | ", note.timestamp), Style::default().fg(Color::Cyan)),
                Span::raw(note.text.as_str()),
            ])
        };
        lines.push(line);
    }

    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Panic Attack Log - {}", state.db_label)),
    );
    f.render_widget(p, area);
}
