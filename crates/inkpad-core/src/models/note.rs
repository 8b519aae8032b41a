//! Note model

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix of the title given to freshly created notes.
pub const DEFAULT_NOTE_TITLE: &str = "Note";

/// A unique identifier for a note.
///
/// New ids are UUID v7 strings (time-sortable with a random tail), but any
/// string is accepted when loading a persisted collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A note in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Human-readable title
    pub title: String,
    /// Markdown body
    pub content: String,
    /// Creation timestamp (Unix ms)
    pub create_time: i64,
    /// Last update timestamp (Unix ms)
    pub update_time: i64,
}

impl Note {
    /// Create an empty note stamped with `now_ms`.
    ///
    /// The title defaults to [`DEFAULT_NOTE_TITLE`] followed by the local
    /// creation time.
    #[must_use]
    pub fn new(now_ms: i64) -> Self {
        Self {
            id: NoteId::new(),
            title: default_title(now_ms),
            content: String::new(),
            create_time: now_ms,
            update_time: now_ms,
        }
    }

    /// Return a copy with `update` applied and `update_time` bumped.
    ///
    /// `id` and `create_time` are carried over; `update_time` never moves
    /// backwards even if the wall clock does.
    #[must_use]
    pub fn with_update(&self, update: NoteUpdate, now_ms: i64) -> Self {
        Self {
            id: self.id.clone(),
            title: update.title.unwrap_or_else(|| self.title.clone()),
            content: update.content.unwrap_or_else(|| self.content.clone()),
            create_time: self.create_time,
            update_time: now_ms.max(self.update_time),
        }
    }

    /// Case-insensitive substring match against title or content.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }
}

/// Partial update for a note. Supplied fields win; `None` keeps the prior value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl NoteUpdate {
    /// Update only the title.
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
        }
    }

    /// Update only the content.
    #[must_use]
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(content.into()),
        }
    }

    /// True when neither field is supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

fn default_title(now_ms: i64) -> String {
    let time = Local
        .timestamp_millis_opt(now_ms)
        .single()
        .map_or_else(|| now_ms.to_string(), |dt| dt.format("%H:%M:%S").to_string());
    format!("{DEFAULT_NOTE_TITLE}-{time}")
}
