//! Note store calls made on behalf of the UI.
//!
//! Each call runs on tokio's blocking pool, reports failures as status events and, after a
//! mutation, re-lists the notes so the UI always renders what is in the database.

use crate::error::NoteError;
use crate::model::{AppEvent, InfoEvent};
use crate::storage::NoteStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Run `f` against the store off the async workers. Errors are reported on `event_tx`.
async fn store_call<T, F>(
    store: &Arc<NoteStore>,
    event_tx: &UnboundedSender<AppEvent>,
    f: F,
) -> Option<T>
where
    F: FnOnce(&NoteStore) -> Result<T, NoteError> + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone();
    let res = tokio::task::spawn_blocking(move || f(&store)).await;
    let err = match res {
        Ok(Ok(v)) => return Some(v),
        Ok(Err(e)) if e.is_rejection() => InfoEvent::NoteRejected(e.to_string()),
        Ok(Err(e)) => {
            warn!(error = %e, "note store call failed");
            InfoEvent::StoreFailed(e.to_string())
        }
        Err(e) => {
            warn!(error = %e, "note store task failed");
            InfoEvent::StoreFailed(format!("store task failed: {e}"))
        }
    };
    let _ = event_tx.send(AppEvent::Info(err));
    None
}

pub(crate) async fn refresh(store: &Arc<NoteStore>, event_tx: &UnboundedSender<AppEvent>) {
    if let Some(notes) = store_call(store, event_tx, |s| s.list_notes()).await {
        let _ = event_tx.send(AppEvent::NotesLoaded { notes });
    }
}

pub(crate) async fn save(
    store: &Arc<NoteStore>,
    event_tx: &UnboundedSender<AppEvent>,
    text: String,
) {
    let saved = store_call(store, event_tx, move |s| s.save_note(&text)).await;
    if let Some(note) = saved {
        let _ = event_tx.send(AppEvent::Info(InfoEvent::NoteSaved { id: note.id }));
        refresh(store, event_tx).await;
    }
}

pub(crate) async fn delete(
    store: &Arc<NoteStore>,
    event_tx: &UnboundedSender<AppEvent>,
    selection: Option<i64>,
) {
    let deleted = store_call(store, event_tx, move |s| s.delete_note(selection)).await;
    if let Some(id) = deleted {
        let _ = event_tx.send(AppEvent::Info(InfoEvent::NoteDeleted { id }));
    }
    // A stale selection still warrants a re-list so the view catches up.
    if selection.is_some() {
        refresh(store, event_tx).await;
    }
}

pub(crate) async fn export(
    store: &Arc<NoteStore>,
    event_tx: &UnboundedSender<AppEvent>,
    path: PathBuf,
) {
    if let Some(p) = store_call(store, event_tx, move |s| s.export_json(&path)).await {
        let _ = event_tx.send(AppEvent::Info(InfoEvent::Message(format!(
            "Exported notes: {}",
            p.display()
        ))));
    }
}
