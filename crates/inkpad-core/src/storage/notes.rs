//! Note collection adapter over a key-value store.

use super::KeyValueStore;
use crate::{Note, Result};

/// Fixed key under which the serialized note collection is stored.
pub const STORAGE_KEY: &str = "inkpad-notes";

/// Reads and writes the entire note collection as one JSON array.
#[derive(Debug, Clone)]
pub struct NotesStorage<S> {
    store: S,
}

impl<S: KeyValueStore> NotesStorage<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying key-value store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Load the persisted collection.
    ///
    /// A missing, unreadable, or unparseable blob yields an empty collection.
    pub fn load(&self) -> Vec<Note> {
        let raw = match self.store.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                tracing::warn!("Failed to read stored notes: {}", error);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Note>>(&raw) {
            Ok(notes) => notes,
            Err(error) => {
                tracing::warn!("Ignoring unparseable notes blob: {}", error);
                Vec::new()
            }
        }
    }

    /// Serialize the full collection and overwrite the stored blob.
    pub fn save(&self, notes: &[Note]) -> Result<()> {
        let raw = serde_json::to_string(notes)?;
        self.store.set(STORAGE_KEY, &raw)?;
        tracing::debug!("Persisted {} notes", notes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use crate::{Error, NoteId};
    use pretty_assertions::assert_eq;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Storage("unavailable".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("quota exceeded".to_string()))
        }
    }

    #[test]
    fn load_returns_empty_when_absent() {
        let storage = NotesStorage::new(MemoryKeyValueStore::new());
        assert!(storage.load().is_empty());
    }

    #[test]
    fn load_fails_open_on_garbage() {
        let kv = MemoryKeyValueStore::new();
        kv.set(STORAGE_KEY, "{not json").unwrap();
        assert!(NotesStorage::new(kv).load().is_empty());
    }

    #[test]
    fn load_fails_open_on_read_error() {
        assert!(NotesStorage::new(FailingStore).load().is_empty());
    }

    #[test]
    fn save_surfaces_write_errors() {
        let result = NotesStorage::new(FailingStore).save(&[]);
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[test]
    fn save_then_load_preserves_order_and_fields() {
        let storage = NotesStorage::new(MemoryKeyValueStore::new());
        let first = Note {
            id: NoteId::from("b"),
            title: "Second".to_string(),
            content: "newer".to_string(),
            create_time: 20,
            update_time: 30,
        };
        let second = Note {
            id: NoteId::from("a"),
            title: "First".to_string(),
            content: "older".to_string(),
            create_time: 10,
            update_time: 10,
        };

        storage.save(&[first.clone(), second.clone()]).unwrap();
        assert_eq!(storage.load(), vec![first, second]);
    }

    #[test]
    fn load_accepts_legacy_blob_ids() {
        let kv = MemoryKeyValueStore::new();
        kv.set(
            STORAGE_KEY,
            r##"[{"id":"1715000000000-k3j9x0abc","title":"Hi","content":"# Hello","createTime":1715000000000,"updateTime":1715000000500}]"##,
        )
        .unwrap();

        let notes = NotesStorage::new(kv).load();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id.as_str(), "1715000000000-k3j9x0abc");
        assert_eq!(notes[0].update_time, 1_715_000_000_500);
    }
}
