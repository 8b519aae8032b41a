use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use inkpad_core::export::{
    DirectorySink, ExportFile, FallbackSink, ImageFileCapture, SaveOutcome, SaveSink,
};
use inkpad_core::{Error, ExportOutcome, Exporter};

use crate::cli::ExportFormat;
use crate::commands::common::{resolve_note_id, Context};
use crate::error::CliError;

pub struct ExportArgs {
    pub id: Option<String>,
    pub format: ExportFormat,
    pub view: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub force: bool,
    /// Whether an overwrite can be confirmed on the terminal.
    pub interactive: bool,
    /// Directory used when the output directory cannot be written.
    pub fallback_dir: PathBuf,
}

pub async fn run_export(args: ExportArgs, ctx: &Context) -> Result<(), CliError> {
    let options = ctx.config.export.to_options()?;

    let mut store = ctx.open_store();
    if let Some(id) = args.id.as_deref() {
        let note_id = resolve_note_id(store.notes(), id)?;
        store.select_note(note_id);
    }

    let output_dir = match args.output.or_else(|| ctx.config.export.output_dir.clone()) {
        Some(dir) => dir,
        None => env::current_dir()?,
    };
    let sink = FallbackSink::new(
        PromptSink::new(DirectorySink::new(output_dir), args.force, args.interactive),
        PromptSink::new(
            DirectorySink::new(args.fallback_dir),
            args.force,
            args.interactive,
        ),
    );

    let exporter = Exporter::new(ImageFileCapture::new(args.view), sink, ctx.toaster.clone())
        .with_options(options);

    match exporter.export(&store, args.format.into()).await {
        ExportOutcome::Saved(path) => {
            println!("{}", path.display());
            Ok(())
        }
        ExportOutcome::Cancelled => {
            eprintln!("Export cancelled");
            Ok(())
        }
        ExportOutcome::Failed => Err(CliError::ExportFailed),
    }
}

/// Where exports land when the requested directory cannot be written.
pub fn fallback_export_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(env::temp_dir)
}

/// Directory sink that asks before replacing an existing file.
///
/// When not `interactive`, an existing file is left alone unless `force` is
/// set.
pub struct PromptSink {
    inner: DirectorySink,
    force: bool,
    interactive: bool,
}

impl PromptSink {
    pub const fn new(inner: DirectorySink, force: bool, interactive: bool) -> Self {
        Self {
            inner,
            force,
            interactive,
        }
    }
}

/// Whether stdin can answer an overwrite prompt.
pub fn stdin_is_interactive() -> bool {
    io::stdin().is_terminal()
}

impl SaveSink for PromptSink {
    async fn save(&self, file: &ExportFile) -> inkpad_core::Result<SaveOutcome> {
        let path = self.inner.target_path(&file.file_name)?;

        if !self.force && tokio::fs::try_exists(&path).await? {
            if !self.interactive {
                tracing::warn!(
                    "{} already exists; pass --force to overwrite",
                    path.display()
                );
                return Ok(SaveOutcome::Cancelled);
            }

            let prompt = format!("{} already exists. Overwrite? [y/N] ", path.display());
            let confirmed = tokio::task::spawn_blocking(move || confirm(&prompt))
                .await
                .map_err(|error| Error::Sink(format!("Prompt task failed: {error}")))??;
            if !confirmed {
                return Ok(SaveOutcome::Cancelled);
            }
        }

        self.inner.save(file).await
    }
}

fn confirm(prompt: &str) -> io::Result<bool> {
    let mut stderr = io::stderr().lock();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(is_confirmation(&answer))
}

pub fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
