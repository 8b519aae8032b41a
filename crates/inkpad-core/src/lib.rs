//! inkpad-core - Core library for inkpad
//!
//! This crate contains the note model, the note store and its persistence,
//! the export pipeline, and the toast notifier used by inkpad front ends.

pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod notify;
pub mod storage;
pub mod store;
pub mod util;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use export::{ExportFormat, ExportOutcome, Exporter};
pub use models::{Note, NoteId, NoteUpdate};
pub use notify::{ToastKind, ToastState, Toaster};
pub use store::NoteStore;
