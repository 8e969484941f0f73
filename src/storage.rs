//! SQLite-backed note log.
//!
//! Every call goes straight to the database; there is no cache, so a list issued right
//! after a save or delete always reflects it.

use crate::error::NoteError;
use crate::model::Note;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{debug, info};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS panic_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    datetime TEXT NOT NULL,
    note TEXT NOT NULL
);";

pub struct NoteStore {
    conn: Mutex<Connection>,
}

impl NoteStore {
    /// Open (or create) the note database at `path`.
    pub fn open(path: &Path) -> Result<Self, NoteError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| NoteError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened note store");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, NoteError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, NoteError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, NoteError> {
        self.conn.lock().map_err(|_| NoteError::Poisoned)
    }

    /// All notes, newest first.
    pub fn list_notes(&self) -> Result<Vec<Note>, NoteError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, datetime, note FROM panic_logs ORDER BY datetime DESC, id DESC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Note {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                text: row.get(2)?,
            })
        })?;
        let notes = rows.collect::<Result<Vec<_>, _>>()?;
        debug!(count = notes.len(), "listed notes");
        Ok(notes)
    }

    /// Insert a note stamped with the current time.
    pub fn save_note(&self, text: &str) -> Result<Note, NoteError> {
        self.save_note_at(text, &now_timestamp())
    }

    pub fn save_note_at(&self, text: &str, timestamp: &str) -> Result<Note, NoteError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NoteError::Empty);
        }
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO panic_logs (datetime, note) VALUES (?1, ?2)",
            params![timestamp, text],
        )?;
        let note = Note {
            id: conn.last_insert_rowid(),
            timestamp: timestamp.to_string(),
            text: text.to_string(),
        };
        info!(id = note.id, "saved note");
        Ok(note)
    }

    /// Delete the selected note. `None` means nothing is selected.
    pub fn delete_note(&self, selection: Option<i64>) -> Result<i64, NoteError> {
        let id = selection.ok_or(NoteError::NothingSelected)?;
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM panic_logs WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(NoteError::NotFound(id));
        }
        info!(id, "deleted note");
        Ok(id)
    }

    /// Write every note to `path` as pretty-printed JSON.
    pub fn export_json(&self, path: &Path) -> Result<PathBuf, NoteError> {
        let notes = self.list_notes()?;
        let out = serde_json::to_string_pretty(&notes)?;
        std::fs::write(path, out).map_err(|source| NoteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), count = notes.len(), "exported notes");
        Ok(path.to_path_buf())
    }
}

/// Current local time as `YYYY-MM-DD HH:MM:SS`, falling back to UTC when the local
/// offset cannot be determined.
pub fn now_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Default database location under the user's data directory.
pub fn default_db_path() -> PathBuf {
    base_dir().join("notes.db")
}

pub fn default_log_path() -> PathBuf {
    base_dir().join("panic-relief.log")
}

fn base_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("panic-relief")
}
