//! Application-level orchestration.
//!
//! This module owns the command loop between the UI thread and the session/note-store
//! components. UI layers only send `UiCommand`s and apply the `AppEvent`s that come back.

mod controller;
mod notes;

pub(crate) use controller::{run_controller, UiCommand};
