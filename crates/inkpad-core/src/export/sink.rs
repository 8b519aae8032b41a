//! Destinations for exported files.

use std::path::{Path, PathBuf};

use crate::storage::write_atomic;
use crate::{Error, Result};

/// An export ready to be handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// Suggested file name, already sanitized.
    pub file_name: String,
    pub mime_type: &'static str,
    /// Human-readable file type, e.g. for save dialogs.
    pub description: &'static str,
    pub bytes: Vec<u8>,
}

/// Result of a delivery attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The file was written to this location.
    Saved(PathBuf),
    /// The user declined to save.
    Cancelled,
}

/// Accepts a finished export and stores it somewhere the user chose.
#[allow(async_fn_in_trait)]
pub trait SaveSink {
    async fn save(&self, file: &ExportFile) -> Result<SaveOutcome>;
}

/// Writes exports into a fixed directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where `file_name` would be written.
    pub fn target_path(&self, file_name: &str) -> Result<PathBuf> {
        let name = Path::new(file_name);
        let is_plain_name = name.file_name().is_some_and(|base| base == name.as_os_str());
        if !is_plain_name {
            return Err(Error::InvalidInput(format!(
                "Export file name must not contain directories: {file_name}"
            )));
        }
        Ok(self.dir.join(name))
    }
}

impl SaveSink for DirectorySink {
    async fn save(&self, file: &ExportFile) -> Result<SaveOutcome> {
        let path = self.target_path(&file.file_name)?;
        let target = path.clone();
        let bytes = file.bytes.clone();

        tokio::task::spawn_blocking(move || write_atomic(&target, &bytes))
            .await
            .map_err(|error| Error::Sink(format!("Write task failed: {error}")))??;

        Ok(SaveOutcome::Saved(path))
    }
}

/// Tries `primary` and falls back to `fallback` when it fails.
///
/// A cancellation from the primary is final. Only the fallback's error is
/// returned to the caller.
#[derive(Debug, Clone)]
pub struct FallbackSink<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackSink<P, F> {
    pub const fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: SaveSink, F: SaveSink> SaveSink for FallbackSink<P, F> {
    async fn save(&self, file: &ExportFile) -> Result<SaveOutcome> {
        match self.primary.save(file).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                tracing::warn!(
                    "Saving {} failed, using fallback location: {}",
                    file.file_name,
                    error
                );
                self.fallback.save(file).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn markdown(name: &str, body: &str) -> ExportFile {
        ExportFile {
            file_name: name.to_string(),
            mime_type: "text/markdown;charset=utf-8",
            description: "Markdown File",
            bytes: body.as_bytes().to_vec(),
        }
    }

    #[derive(Default)]
    struct CountingSink {
        calls: AtomicUsize,
        outcome: Option<SaveOutcome>,
    }

    impl SaveSink for CountingSink {
        async fn save(&self, _file: &ExportFile) -> Result<SaveOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
                .clone()
                .ok_or_else(|| Error::Sink("unsupported".to_string()))
        }
    }

    #[tokio::test]
    async fn directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("exports"));

        let outcome = sink.save(&markdown("a.md", "# hi")).await.unwrap();

        let expected = dir.path().join("exports").join("a.md");
        assert_eq!(outcome, SaveOutcome::Saved(expected.clone()));
        assert_eq!(std::fs::read_to_string(expected).unwrap(), "# hi");
    }

    #[tokio::test]
    async fn directory_sink_rejects_nested_names() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let result = sink.save(&markdown("../escape.md", "")).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn fallback_used_when_primary_fails() {
        let dir = tempfile::tempdir().unwrap();
        let primary = CountingSink::default();
        let sink = FallbackSink::new(primary, DirectorySink::new(dir.path()));

        let outcome = sink.save(&markdown("b.md", "body")).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Saved(dir.path().join("b.md")));
        assert_eq!(sink.primary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_is_not_retried() {
        let primary = CountingSink {
            calls: AtomicUsize::new(0),
            outcome: Some(SaveOutcome::Cancelled),
        };
        let sink = FallbackSink::new(primary, CountingSink::default());

        let outcome = sink.save(&markdown("c.md", "")).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Cancelled);
        assert_eq!(sink.fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fallback_error_surfaces() {
        let sink = FallbackSink::new(CountingSink::default(), CountingSink::default());
        let result = sink.save(&markdown("d.md", "")).await;
        assert!(matches!(result, Err(Error::Sink(_))));
        assert_eq!(sink.fallback.calls.load(Ordering::SeqCst), 1);
    }
}
