use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn bind(key: &'static str, pad: usize, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(format!("{:pad$}{desc}", "")),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        bind("s", 12, "Start / resume panic mode"),
        bind("p", 12, "Pause"),
        bind("x", 12, "Stop and return to idle"),
        bind("tab", 10, "Switch tabs"),
        bind("?", 12, "Show this help"),
        Line::from(""),
        Line::from("Notes tab:"),
        bind("n", 12, "Write a note"),
        bind("Enter", 8, "Save the note being written"),
        bind("Esc", 10, "Stop writing (draft is kept)"),
        bind("↑/↓ j/k", 6, "Select a note"),
        bind("d", 12, "Delete selected note"),
        bind("r", 12, "Refresh notes"),
        bind("e", 12, "Export notes as JSON"),
        Line::from(""),
        Line::from("Breathe in while the circle grows, hold, and breathe out while it shrinks."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
