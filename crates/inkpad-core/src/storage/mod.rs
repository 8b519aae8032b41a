//! Persistence for the note collection.
//!
//! The whole collection is one JSON blob stored under a fixed key in a
//! [`KeyValueStore`]. Reads fail open; writes overwrite the blob.

mod atomic;
mod kv;
mod notes;

pub use atomic::write_atomic;
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use notes::{NotesStorage, STORAGE_KEY};
