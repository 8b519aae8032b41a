//! Data models for inkpad

mod note;

pub use note::{Note, NoteId, NoteUpdate, DEFAULT_NOTE_TITLE};
