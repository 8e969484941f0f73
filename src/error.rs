//! Error types for the note store and the sound backend.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("Note is empty, nothing saved")]
    Empty,

    #[error("No note selected")]
    NothingSelected,

    #[error("Note #{0} no longer exists")]
    NotFound(i64),

    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize notes: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("note store lock poisoned")]
    Poisoned,
}

impl NoteError {
    /// Rejections caused by user input rather than by the store itself. A selection that
    /// points at a row deleted elsewhere counts as one.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            NoteError::Empty | NoteError::NothingSelected | NoteError::NotFound(_)
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("sound asset not found: {0}")]
    AssetMissing(PathBuf),

    #[error("cannot decode {path}: {details}")]
    Decode { path: PathBuf, details: String },

    #[error("audio backend unavailable: {0}")]
    Backend(String),
}
