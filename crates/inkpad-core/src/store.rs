//! In-memory note collection mirrored to persistent storage.
//!
//! [`NoteStore`] owns the canonical ordered list of notes (most recently
//! created or updated first), the active note id, and the search query.
//! Every mutation persists the full collection.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::notify::{ToastKind, Toaster};
use crate::storage::{KeyValueStore, NotesStorage};
use crate::util::unix_timestamp_millis;
use crate::{Note, NoteId, NoteUpdate};

/// Message shown when persisting the collection fails.
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save notes";

/// The application's note state.
#[derive(Debug)]
pub struct NoteStore<S> {
    storage: NotesStorage<S>,
    notes: Vec<Note>,
    active_note_id: Option<NoteId>,
    search_query: String,
    notifier: Option<Toaster>,
    save_failed: AtomicBool,
}

impl<S: KeyValueStore> NoteStore<S> {
    /// Load the persisted collection and select its front note, if any.
    pub fn open(store: S) -> Self {
        let storage = NotesStorage::new(store);
        let notes = storage.load();
        let active_note_id = notes.first().map(|note| note.id.clone());
        tracing::debug!("Loaded {} notes", notes.len());

        Self {
            storage,
            notes,
            active_note_id,
            search_query: String::new(),
            notifier: None,
            save_failed: AtomicBool::new(false),
        }
    }

    /// Report persistence write failures through `toaster`.
    #[must_use]
    pub fn with_notifier(mut self, toaster: Toaster) -> Self {
        self.notifier = Some(toaster);
        self
    }

    /// Create an empty note at the front, select it, and clear the search.
    pub fn add_note(&mut self) -> NoteId {
        let note = self.fresh_note(unix_timestamp_millis());
        let id = note.id.clone();

        self.notes.insert(0, note);
        self.active_note_id = Some(id.clone());
        self.search_query.clear();
        self.persist();
        id
    }

    /// Apply `update` to the note with `id` and move it to the front.
    ///
    /// Returns the updated note, or `None` when `id` is unknown.
    pub fn update_note(&mut self, id: &NoteId, update: NoteUpdate) -> Option<&Note> {
        let index = self.position(id)?;
        let current = self.notes.remove(index);
        let updated = current.with_update(update, unix_timestamp_millis());

        self.notes.insert(0, updated);
        self.persist();
        self.notes.first()
    }

    /// Remove the note with `id`. Returns whether anything was removed.
    ///
    /// Deleting the active note selects the new front note, or nothing when
    /// the collection is empty.
    pub fn delete_note(&mut self, id: &NoteId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        self.notes.remove(index);
        if self.active_note_id.as_ref() == Some(id) {
            self.active_note_id = self.notes.first().map(|note| note.id.clone());
        }
        self.persist();
        true
    }

    /// Set the active id. Unknown ids are accepted; [`active_note`](Self::active_note)
    /// then reports no selection.
    pub fn select_note(&mut self, id: NoteId) {
        self.active_note_id = Some(id);
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.active_note_id = None;
    }

    /// The selected note, if the active id refers to an existing note.
    pub fn active_note(&self) -> Option<&Note> {
        let id = self.active_note_id.as_ref()?;
        self.notes.iter().find(|note| &note.id == id)
    }

    /// Raw active id, which may not refer to an existing note.
    pub const fn active_note_id(&self) -> Option<&NoteId> {
        self.active_note_id.as_ref()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Notes matching the search query, in collection order.
    ///
    /// A blank query matches everything; otherwise title or content must
    /// contain the query, ignoring case.
    pub fn filtered_notes(&self) -> Vec<&Note> {
        if self.search_query.trim().is_empty() {
            return self.notes.iter().collect();
        }

        let needle = self.search_query.to_lowercase();
        self.notes.iter().filter(|note| note.matches(&needle)).collect()
    }

    /// Full ordered collection.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Persist the current collection again.
    pub fn save_all(&self) {
        self.persist();
    }

    /// Whether the most recent write to storage failed.
    pub fn save_failed(&self) -> bool {
        self.save_failed.load(Ordering::Relaxed)
    }

    /// Underlying persistence adapter.
    pub const fn storage(&self) -> &NotesStorage<S> {
        &self.storage
    }

    fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|note| &note.id == id)
    }

    fn fresh_note(&self, now_ms: i64) -> Note {
        let mut note = Note::new(now_ms);
        while self.position(&note.id).is_some() {
            note.id = NoteId::new();
        }
        note
    }

    fn persist(&self) {
        let result = self.storage.save(&self.notes);
        self.save_failed.store(result.is_err(), Ordering::Relaxed);
        if let Err(error) = result {
            tracing::error!("Failed to persist notes: {}", error);
            if let Some(toaster) = &self.notifier {
                toaster.show(SAVE_FAILED_MESSAGE, ToastKind::Error);
            }
        }
    }
}
