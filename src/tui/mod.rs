mod breathe;
mod help;
mod notes;
mod state;

use crate::model::{AppConfig, AppEvent, InfoEvent, SessionState};
use crate::orchestrator::{self, UiCommand};
use crate::session::{sound, SessionController};
use crate::storage::{self, NoteStore};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Tabs},
    Terminal,
};
use state::{UiState, TAB_BREATHE, TAB_COUNT, TAB_HELP, TAB_NOTES};
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::info;

pub async fn run(cfg: AppConfig) -> Result<()> {
    // Unbounded channels: the animation must never block on a slow frame.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let db_path = cfg.db_path.clone();
    let store = tokio::task::spawn_blocking(move || NoteStore::open(&db_path))
        .await
        .context("note store task failed")?
        .with_context(|| format!("open note store {}", cfg.db_path.display()))?;

    let (player, sound_warning) = sound::build_player(&cfg.sound_path, cfg.sound_enabled);
    let session = SessionController::new(cfg.timing, player, event_tx.clone());
    if let Some(w) = sound_warning {
        let _ = event_tx.send(AppEvent::Info(InfoEvent::SoundUnavailable(w)));
    }
    info!(db = %cfg.db_path.display(), "starting ui");

    // TUI runs in a dedicated thread to keep all blocking terminal I/O off the runtime.
    let db_label = cfg.db_path.display().to_string();
    let ui_handle = std::thread::spawn(move || run_threaded(db_label, event_rx, cmd_tx));

    let res = orchestrator::run_controller(session, Arc::new(store), event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread. `UiState` never leaves this thread.
pub fn run_threaded(
    db_label: String,
    mut event_rx: UnboundedReceiver<AppEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState {
        db_label,
        ..Default::default()
    };

    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    let res = 'ui: loop {
        // Drain without blocking; every visible change is applied here, on this thread.
        loop {
            match event_rx.try_recv() {
                Ok(ev) => apply_event(&mut state, ev),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'ui Ok(()),
            }
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(cmd) = handle_key(&mut state, k.code, k.modifiers) {
                    let quit = cmd == UiCommand::Quit;
                    let _ = cmd_tx.send(cmd);
                    if quit {
                        break Ok(());
                    }
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

/// Translate a key press into UI state changes and, when needed, a controller command.
fn handle_key(state: &mut UiState, code: KeyCode, modifiers: KeyModifiers) -> Option<UiCommand> {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Some(UiCommand::Quit);
    }

    if state.draft_editing {
        match code {
            KeyCode::Enter => {
                state.draft_editing = false;
                return Some(UiCommand::SaveNote(state.draft.clone()));
            }
            KeyCode::Esc => state.draft_editing = false,
            KeyCode::Backspace => {
                state.draft.pop();
            }
            KeyCode::Char(c) => state.draft.push(c),
            _ => {}
        }
        return None;
    }

    match code {
        KeyCode::Char('q') => Some(UiCommand::Quit),
        KeyCode::Char('s') => Some(UiCommand::StartOrResume),
        KeyCode::Enter if state.tab == TAB_BREATHE => Some(UiCommand::StartOrResume),
        KeyCode::Char('p') => Some(UiCommand::Pause),
        KeyCode::Char('x') => Some(UiCommand::Stop),
        KeyCode::Tab => {
            state.tab = (state.tab + 1) % TAB_COUNT;
            None
        }
        KeyCode::Char('?') => {
            state.tab = TAB_HELP;
            None
        }
        _ if state.tab != TAB_NOTES => None,
        KeyCode::Char('n') | KeyCode::Char('i') => {
            state.draft_editing = true;
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.select_prev();
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.select_next();
            None
        }
        KeyCode::Char('d') => Some(UiCommand::DeleteNote(state.selected_note_id())),
        KeyCode::Char('r') => Some(UiCommand::RefreshNotes),
        KeyCode::Char('e') => match export_path() {
            Ok(path) => Some(UiCommand::ExportNotes(path)),
            Err(e) => {
                state.info = format!("Export failed: {e:#}");
                None
            }
        },
        _ => None,
    }
}

/// Export target in the current directory, named after the current time.
fn export_path() -> Result<std::path::PathBuf> {
    let name = format!(
        "panic-notes-{}.json",
        storage::now_timestamp().replace([' ', ':'], "-")
    );
    let current_dir = std::env::current_dir().context("get current directory")?;
    Ok(current_dir.join(name))
}

fn apply_event(state: &mut UiState, ev: AppEvent) {
    match ev {
        AppEvent::SessionChanged { state: session } => {
            state.session = session;
            if session == SessionState::Idle {
                state.reset_circle();
            }
        }
        AppEvent::Prompt(msg) => state.prompt = msg,
        AppEvent::Breath {
            phase,
            radius,
            bounds,
        } => {
            // Late frames from an aborted animation must not move an idle circle.
            if state.session != SessionState::Idle {
                state.phase = Some(phase);
                state.radius = radius;
                state.bounds = bounds;
            }
        }
        AppEvent::NotesLoaded { notes } => state.set_notes(notes),
        AppEvent::Info(info) => {
            match &info {
                InfoEvent::NoteSaved { .. } => state.draft.clear(),
                InfoEvent::SoundUnavailable(w) => state.sound_warning = Some(w.clone()),
                _ => {}
            }
            state.info = info.to_message();
        }
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![
        Line::from("Breathe"),
        Line::from("Notes"),
        Line::from("Help"),
    ])
    .select(state.tab)
    .block(Block::default().borders(Borders::ALL).title("panic-relief"))
    .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        TAB_BREATHE => breathe::draw_breathe(chunks[1], f, state),
        TAB_NOTES => notes::draw_notes(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f),
    }
}
