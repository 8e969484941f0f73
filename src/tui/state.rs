use crate::model::{BreathPhase, CircleBounds, Note, SessionState, MIN_RADIUS};
use crate::session::messages::GREETING;
use ratatui::{
    style::Color,
    style::Style,
    text::{Line, Span},
};

pub const TAB_BREATHE: usize = 0;
pub const TAB_NOTES: usize = 1;
pub const TAB_HELP: usize = 2;
pub const TAB_COUNT: usize = 3;

pub struct UiState {
    pub tab: usize,
    pub session: SessionState,
    /// Calming message shown above the circle.
    pub prompt: String,
    pub info: String,
    pub phase: Option<BreathPhase>,
    pub radius: u32,
    pub bounds: CircleBounds,
    pub sound_warning: Option<String>,
    pub db_label: String,

    pub notes: Vec<Note>,
    pub notes_selected: Option<usize>, // Index into `notes`, None = nothing selected
    pub notes_scroll_offset: usize,
    pub draft: String,
    pub draft_editing: bool, // Whether keystrokes go into the note input
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: TAB_BREATHE,
            session: SessionState::Idle,
            prompt: GREETING.to_string(),
            info: String::new(),
            phase: None,
            radius: MIN_RADIUS,
            bounds: CircleBounds::default(),
            sound_warning: None,
            db_label: String::new(),
            notes: Vec::new(),
            notes_selected: None,
            notes_scroll_offset: 0,
            draft: String::new(),
            draft_editing: false,
        }
    }
}

impl UiState {
    pub fn selected_note_id(&self) -> Option<i64> {
        self.notes_selected
            .and_then(|idx| self.notes.get(idx))
            .map(|n| n.id)
    }

    /// Replace the note list, keeping the selection on the same note when it survived.
    pub fn set_notes(&mut self, notes: Vec<Note>) {
        let previous = self.selected_note_id();
        self.notes = notes;
        self.notes_selected = match previous {
            Some(id) => self
                .notes
                .iter()
                .position(|n| n.id == id)
                .or_else(|| self.notes_selected.map(|i| i.min(self.notes.len().saturating_sub(1))))
                .filter(|_| !self.notes.is_empty()),
            None => None,
        };
        if self.notes_scroll_offset >= self.notes.len() {
            self.notes_scroll_offset = self.notes.len().saturating_sub(1);
        }
    }

    pub fn select_next(&mut self) {
        if self.notes.is_empty() {
            return;
        }
        self.notes_selected = Some(match self.notes_selected {
            None => 0,
            Some(i) => (i + 1).min(self.notes.len() - 1),
        });
    }

    pub fn select_prev(&mut self) {
        if self.notes.is_empty() {
            return;
        }
        self.notes_selected = Some(match self.notes_selected {
            None | Some(0) => 0,
            Some(i) => i - 1,
        });
    }

    /// First visible row so that the selection stays on screen.
    pub fn visible_offset(&self, max_items: usize) -> usize {
        let max_items = max_items.max(1);
        let mut offset = self
            .notes_scroll_offset
            .min(self.notes.len().saturating_sub(1));
        if let Some(sel) = self.notes_selected {
            if sel < offset {
                offset = sel;
            } else if sel >= offset + max_items {
                offset = sel + 1 - max_items;
            }
        }
        offset
    }

    pub fn reset_circle(&mut self) {
        self.phase = None;
        self.radius = MIN_RADIUS;
        self.bounds = CircleBounds::default();
    }

    pub fn session_color(&self) -> Color {
        match self.session {
            SessionState::Active => Color::LightBlue,
            SessionState::Paused => Color::Yellow,
            SessionState::Idle => Color::Gray,
        }
    }
}

pub fn key_hint(key: &'static str, desc: &'static str) -> Vec<Span<'static>> {
    vec![
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(format!(": {desc}  ")),
    ]
}

pub fn status_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}
