//! Session and note-log controller.
//!
//! Receives commands from the UI thread, drives the session state machine and the note
//! store, and emits events back for the UI to apply.

use super::notes;
use crate::model::AppEvent;
use crate::session::SessionController;
use crate::storage::NoteStore;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

/// Commands emitted by UI layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UiCommand {
    StartOrResume,
    Pause,
    Stop,
    SaveNote(String),
    /// `None` when no note is selected.
    DeleteNote(Option<i64>),
    RefreshNotes,
    ExportNotes(PathBuf),
    Quit,
}

/// Process UI commands until `Quit`, the command channel closes, or Ctrl-C arrives.
pub(crate) async fn run_controller(
    mut session: SessionController,
    store: Arc<NoteStore>,
    event_tx: UnboundedSender<AppEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    notes::refresh(&store, &event_tx).await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    break;
                };
                debug!(?cmd, "ui command");
                match cmd {
                    UiCommand::StartOrResume => {
                        session.start_or_resume();
                    }
                    UiCommand::Pause => {
                        session.pause();
                    }
                    UiCommand::Stop => {
                        session.stop();
                    }
                    UiCommand::SaveNote(text) => notes::save(&store, &event_tx, text).await,
                    UiCommand::DeleteNote(selection) => {
                        notes::delete(&store, &event_tx, selection).await
                    }
                    UiCommand::RefreshNotes => notes::refresh(&store, &event_tx).await,
                    UiCommand::ExportNotes(path) => notes::export(&store, &event_tx, path).await,
                    UiCommand::Quit => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    session.stop();
    info!("controller finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BreathTiming, InfoEvent, Note, SessionState};
    use crate::session::sound::NullPlayer;
    use tokio::sync::mpsc::unbounded_channel;

    struct Harness {
        cmd_tx: UnboundedSender<UiCommand>,
        event_rx: UnboundedReceiver<AppEvent>,
        handle: tokio::task::JoinHandle<Result<()>>,
        store: Arc<NoteStore>,
    }

    fn spawn_controller() -> Harness {
        spawn_with_store(NoteStore::open_in_memory().unwrap())
    }

    fn spawn_with_store(store: NoteStore) -> Harness {
        let (event_tx, event_rx) = unbounded_channel();
        let (cmd_tx, cmd_rx) = unbounded_channel();
        let store = Arc::new(store);
        let session =
            SessionController::new(BreathTiming::default(), Arc::new(NullPlayer), event_tx.clone());
        let handle = tokio::spawn(run_controller(session, store.clone(), event_tx, cmd_rx));
        Harness {
            cmd_tx,
            event_rx,
            handle,
            store,
        }
    }

    async fn next_notes(rx: &mut UnboundedReceiver<AppEvent>) -> Vec<Note> {
        loop {
            match rx.recv().await {
                Some(AppEvent::NotesLoaded { notes }) => return notes,
                Some(_) => continue,
                None => panic!("event channel closed"),
            }
        }
    }

    async fn next_info(rx: &mut UnboundedReceiver<AppEvent>) -> InfoEvent {
        loop {
            match rx.recv().await {
                Some(AppEvent::Info(info)) => return info,
                Some(_) => continue,
                None => panic!("event channel closed"),
            }
        }
    }

    async fn next_state(rx: &mut UnboundedReceiver<AppEvent>) -> SessionState {
        loop {
            match rx.recv().await {
                Some(AppEvent::SessionChanged { state }) => return state,
                Some(_) => continue,
                None => panic!("event channel closed"),
            }
        }
    }

    #[tokio::test]
    async fn initial_refresh_then_save_relists() {
        let mut h = spawn_controller();
        assert!(next_notes(&mut h.event_rx).await.is_empty());

        h.cmd_tx.send(UiCommand::SaveNote("hello".into())).unwrap();
        assert!(matches!(
            next_info(&mut h.event_rx).await,
            InfoEvent::NoteSaved { .. }
        ));
        let notes = next_notes(&mut h.event_rx).await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].text, "hello");
        assert!(!notes[0].timestamp.is_empty());

        h.cmd_tx.send(UiCommand::Quit).unwrap();
        h.handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn blank_note_and_missing_selection_give_feedback() {
        let mut h = spawn_controller();
        next_notes(&mut h.event_rx).await;

        h.cmd_tx.send(UiCommand::SaveNote("   ".into())).unwrap();
        assert_eq!(
            next_info(&mut h.event_rx).await,
            InfoEvent::NoteRejected("Note is empty, nothing saved".into())
        );

        h.cmd_tx.send(UiCommand::DeleteNote(None)).unwrap();
        assert_eq!(
            next_info(&mut h.event_rx).await,
            InfoEvent::NoteRejected("No note selected".into())
        );
        assert!(h.store.list_notes().unwrap().is_empty());

        drop(h.cmd_tx);
        h.handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn delete_removes_selected_note_and_relists() {
        let mut h = spawn_controller();
        next_notes(&mut h.event_rx).await;
        let keep = h.store.save_note("keep").unwrap();
        let gone = h.store.save_note("gone").unwrap();

        h.cmd_tx.send(UiCommand::DeleteNote(Some(gone.id))).unwrap();
        assert_eq!(
            next_info(&mut h.event_rx).await,
            InfoEvent::NoteDeleted { id: gone.id }
        );
        assert_eq!(next_notes(&mut h.event_rx).await, vec![keep]);

        h.cmd_tx.send(UiCommand::Quit).unwrap();
        h.handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn session_commands_change_state() {
        let mut h = spawn_controller();
        next_notes(&mut h.event_rx).await;

        h.cmd_tx.send(UiCommand::StartOrResume).unwrap();
        assert_eq!(next_state(&mut h.event_rx).await, SessionState::Active);
        h.cmd_tx.send(UiCommand::Pause).unwrap();
        assert_eq!(next_state(&mut h.event_rx).await, SessionState::Paused);
        h.cmd_tx.send(UiCommand::Stop).unwrap();
        assert_eq!(next_state(&mut h.event_rx).await, SessionState::Idle);

        h.cmd_tx.send(UiCommand::Quit).unwrap();
        h.handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn stale_selection_is_rejected_and_relisted() {
        let mut h = spawn_controller();
        next_notes(&mut h.event_rx).await;
        let kept = h.store.save_note("kept").unwrap();

        h.cmd_tx.send(UiCommand::DeleteNote(Some(kept.id + 1))).unwrap();
        assert_eq!(
            next_info(&mut h.event_rx).await,
            InfoEvent::NoteRejected(format!("Note #{} no longer exists", kept.id + 1))
        );
        assert_eq!(next_notes(&mut h.event_rx).await, vec![kept]);

        h.cmd_tx.send(UiCommand::Quit).unwrap();
        h.handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn store_failures_are_reported_and_the_loop_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("notes.db");
        let store = NoteStore::open(&db).unwrap();
        rusqlite::Connection::open(&db)
            .unwrap()
            .execute("DROP TABLE panic_logs", [])
            .unwrap();

        let mut h = spawn_with_store(store);
        // Initial listing already hits the missing table.
        assert!(matches!(
            next_info(&mut h.event_rx).await,
            InfoEvent::StoreFailed(_)
        ));

        h.cmd_tx.send(UiCommand::SaveNote("still here".into())).unwrap();
        match next_info(&mut h.event_rx).await {
            InfoEvent::StoreFailed(msg) => assert!(msg.contains("panic_logs"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }

        h.cmd_tx.send(UiCommand::DeleteNote(Some(1))).unwrap();
        assert!(matches!(
            next_info(&mut h.event_rx).await,
            InfoEvent::StoreFailed(_)
        ));

        h.cmd_tx.send(UiCommand::Quit).unwrap();
        h.handle.await.unwrap().unwrap();
    }
}
