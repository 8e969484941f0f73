use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Center of the breathing canvas on both axes.
pub const CIRCLE_CENTER: f64 = 100.0;
/// Smallest radius the circle ever reaches (rest size).
pub const MIN_RADIUS: u32 = 40;
/// Largest radius, reached at the end of an inhale.
pub const MAX_RADIUS: u32 = 80;
/// Radius change per animation step.
pub const RADIUS_STEP: u32 = 4;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub sound_path: PathBuf,
    pub sound_enabled: bool,
    pub timing: BreathTiming,
    pub log_file: PathBuf,
}

/// Pacing of the breathing animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathTiming {
    /// Sleep between two radius steps.
    pub step_interval: Duration,
    /// Time spent at full size between inhale and exhale.
    pub hold: Duration,
    /// How often a paused animation re-checks the session state.
    pub pause_poll: Duration,
}

impl Default for BreathTiming {
    fn default() -> Self {
        Self {
            step_interval: Duration::from_millis(100),
            hold: Duration::from_millis(700),
            pause_poll: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Active,
    Paused,
}

impl SessionState {
    pub fn label(self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Active => "Active",
            SessionState::Paused => "Paused",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
}

impl BreathPhase {
    pub fn cue(self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Breathe in…",
            BreathPhase::Hold => "Hold…",
            BreathPhase::Exhale => "Breathe out…",
        }
    }
}

/// Axis-aligned bounds of the breathing circle: `(x0, y0, x1, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleBounds {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl CircleBounds {
    pub fn from_radius(radius: u32) -> Self {
        let r = f64::from(radius);
        Self {
            x0: CIRCLE_CENTER - r,
            y0: CIRCLE_CENTER - r,
            x1: CIRCLE_CENTER + r,
            y1: CIRCLE_CENTER + r,
        }
    }

    pub fn radius(&self) -> f64 {
        (self.x1 - self.x0) / 2.0
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }
}

impl Default for CircleBounds {
    fn default() -> Self {
        Self::from_radius(MIN_RADIUS)
    }
}

/// A timestamped free-text entry about a panic episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    #[serde(rename = "datetime")]
    pub timestamp: String,
    #[serde(rename = "note")]
    pub text: String,
}

impl Note {
    /// Single-line rendering used by list views and text output.
    pub fn to_line(&self) -> String {
        format!("{} | {} | {}", self.id, self.timestamp, self.text)
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    SessionChanged {
        state: SessionState,
    },
    /// A calming message to show above the circle.
    Prompt(String),
    Breath {
        phase: BreathPhase,
        radius: u32,
        bounds: CircleBounds,
    },
    NotesLoaded {
        notes: Vec<Note>,
    },
    Info(InfoEvent),
}

/// Structured status events consumed by the UI/CLI layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoEvent {
    Message(String),
    SessionStarted,
    SessionResumed,
    SessionPaused,
    SessionStopped,
    NoteSaved { id: i64 },
    NoteDeleted { id: i64 },
    NoteRejected(String),
    StoreFailed(String),
    SoundUnavailable(String),
}

impl InfoEvent {
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::SessionStarted => "Panic mode started!".to_string(),
            InfoEvent::SessionResumed => "Panic mode resumed!".to_string(),
            InfoEvent::SessionPaused => "Panic mode paused.".to_string(),
            InfoEvent::SessionStopped => "Panic mode stopped.".to_string(),
            InfoEvent::NoteSaved { id } => format!("Saved note #{}", id),
            InfoEvent::NoteDeleted { id } => format!("Deleted note #{}", id),
            InfoEvent::NoteRejected(reason) => reason.clone(),
            InfoEvent::StoreFailed(err) => format!("Note store error: {}", err),
            InfoEvent::SoundUnavailable(err) => format!("Sound unavailable: {}", err),
        }
    }
}
