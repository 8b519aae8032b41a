//! Exporting the active note as a Markdown file or a paginated PDF.
//!
//! Both operations read the active note from a [`NoteStore`], build an
//! [`ExportFile`], and hand it to a [`SaveSink`]. Failures never propagate:
//! each operation reports its outcome through the [`Toaster`] and returns an
//! [`ExportOutcome`].

mod capture;
mod layout;
mod pdf;
mod sink;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use capture::{compose_view, CaptureOptions, ImageFileCapture, RenderedView, ViewCapture};
pub use layout::{page_count, plan_pages, PageBand, PageGeometry, PageLayout};
pub use pdf::render_pdf;
pub use sink::{DirectorySink, ExportFile, FallbackSink, SaveOutcome, SaveSink};

use crate::notify::{ToastKind, Toaster};
use crate::storage::KeyValueStore;
use crate::store::NoteStore;
use crate::util::export_file_name;
use crate::{Error, Note, Result};

pub const NO_NOTE_SELECTED: &str = "No note selected";
pub const MARKDOWN_EXPORTED: &str = "Markdown exported";
pub const MARKDOWN_EXPORT_FAILED: &str = "Markdown export failed";
pub const PREVIEW_UNAVAILABLE: &str = "Unable to get preview content";
pub const GENERATING_PDF: &str = "Generating PDF...";
pub const PDF_EXPORTED: &str = "PDF exported";
pub const PDF_EXPORT_FAILED: &str = "PDF export failed";

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Pdf,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Pdf => "pdf",
        }
    }

    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown;charset=utf-8",
            Self::Pdf => "application/pdf",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown File",
            Self::Pdf => "PDF File",
        }
    }
}

/// Tunables for document export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub capture: CaptureOptions,
    pub page: PageGeometry,
    pub jpeg_quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            capture: CaptureOptions::default(),
            page: PageGeometry::A4,
            jpeg_quality: 92,
        }
    }
}

/// How an export operation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    /// The user declined at the sink. No notification is shown.
    Cancelled,
    /// The operation aborted; an error notification was shown.
    Failed,
}

/// Build the Markdown export of `note`: its content, byte for byte.
#[must_use]
pub fn build_text_export(note: &Note) -> ExportFile {
    let format = ExportFormat::Markdown;
    ExportFile {
        file_name: export_file_name(&note.title, format.extension()),
        mime_type: format.mime_type(),
        description: format.description(),
        bytes: note.content.as_bytes().to_vec(),
    }
}

/// Paginate `view` onto pages and build the PDF export of `note`.
pub fn build_document_export(
    note: &Note,
    view: &RenderedView,
    options: &ExportOptions,
) -> Result<ExportFile> {
    let layout = plan_pages(view.width(), view.height(), options.page)?;
    tracing::debug!(
        "Paginating {}x{} view onto {} page(s)",
        view.width(),
        view.height(),
        layout.page_count()
    );
    let bytes = render_pdf(
        &view.image,
        &layout,
        options.page,
        options.jpeg_quality,
        &note.title,
    )?;

    let format = ExportFormat::Pdf;
    Ok(ExportFile {
        file_name: export_file_name(&note.title, format.extension()),
        mime_type: format.mime_type(),
        description: format.description(),
        bytes,
    })
}

/// Runs export operations against a view source and a save sink.
pub struct Exporter<C, S> {
    capture: C,
    sink: S,
    toaster: Toaster,
    options: ExportOptions,
}

impl<C: ViewCapture, S: SaveSink> Exporter<C, S> {
    pub fn new(capture: C, sink: S, toaster: Toaster) -> Self {
        Self {
            capture,
            sink,
            toaster,
            options: ExportOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub const fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export the active note in `format`.
    pub async fn export<K: KeyValueStore>(
        &self,
        store: &NoteStore<K>,
        format: ExportFormat,
    ) -> ExportOutcome {
        match format {
            ExportFormat::Markdown => self.export_text(store).await,
            ExportFormat::Pdf => self.export_document(store).await,
        }
    }

    /// Save the active note's content as a `.md` file.
    pub async fn export_text<K: KeyValueStore>(&self, store: &NoteStore<K>) -> ExportOutcome {
        let Some(note) = self.active_note(store) else {
            return ExportOutcome::Failed;
        };

        let file = build_text_export(&note);
        self.deliver(&file, MARKDOWN_EXPORTED, MARKDOWN_EXPORT_FAILED)
            .await
    }

    /// Capture the active note's rendered view and save it as a paginated `.pdf`.
    pub async fn export_document<K: KeyValueStore>(&self, store: &NoteStore<K>) -> ExportOutcome {
        let Some(note) = self.active_note(store) else {
            return ExportOutcome::Failed;
        };

        self.toaster.show(GENERATING_PDF, ToastKind::Info);

        let view = match self.capture.capture(&note, &self.options.capture).await {
            Ok(view) => view,
            Err(Error::ViewUnavailable(reason)) => {
                tracing::warn!("Cannot export {} as PDF: {}", note.id, reason);
                self.toaster.show(PREVIEW_UNAVAILABLE, ToastKind::Error);
                return ExportOutcome::Failed;
            }
            Err(error) => return self.fail(&error, PDF_EXPORT_FAILED),
        };

        let file = match build_document_export(&note, &view, &self.options) {
            Ok(file) => file,
            Err(error) => return self.fail(&error, PDF_EXPORT_FAILED),
        };

        self.deliver(&file, PDF_EXPORTED, PDF_EXPORT_FAILED).await
    }

    fn active_note<K: KeyValueStore>(&self, store: &NoteStore<K>) -> Option<Note> {
        let note = store.active_note().cloned();
        if note.is_none() {
            self.toaster.show(NO_NOTE_SELECTED, ToastKind::Error);
        }
        note
    }

    async fn deliver(
        &self,
        file: &ExportFile,
        success_message: &str,
        failure_message: &str,
    ) -> ExportOutcome {
        match self.sink.save(file).await {
            Ok(SaveOutcome::Saved(path)) => {
                tracing::info!("Exported {} to {}", file.file_name, path.display());
                self.toaster.show(success_message, ToastKind::Success);
                ExportOutcome::Saved(path)
            }
            Ok(SaveOutcome::Cancelled) => {
                tracing::debug!("Export of {} cancelled", file.file_name);
                ExportOutcome::Cancelled
            }
            Err(error) => self.fail(&error, failure_message),
        }
    }

    fn fail(&self, error: &Error, message: &str) -> ExportOutcome {
        tracing::error!("{}: {}", message, error);
        self.toaster.show(message, ToastKind::Error);
        ExportOutcome::Failed
    }
}
