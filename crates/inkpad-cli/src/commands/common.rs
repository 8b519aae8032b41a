use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use inkpad_core::config::CONFIG_FILE_NAME;
use inkpad_core::storage::FileKeyValueStore;
use inkpad_core::{AppConfig, Note, NoteId, NoteStore, ToastKind, ToastState, Toaster};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::error::CliError;

pub const DATA_DIR_ENV: &str = "INKPAD_DATA_DIR";

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub data_dir: PathBuf,
    pub config: AppConfig,
    pub toaster: Toaster,
}

impl Context {
    pub fn open_store(&self) -> NoteStore<FileKeyValueStore> {
        NoteStore::open(FileKeyValueStore::new(self.data_dir.clone()))
            .with_notifier(self.toaster.clone())
    }
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub content: String,
    pub create_time: i64,
    pub update_time: i64,
    pub relative_time: String,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("inkpad").join(CONFIG_FILE_NAME))
}

pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, CliError> {
    match explicit.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => Ok(AppConfig::load_from_path(&path)?),
        None => Ok(AppConfig::default()),
    }
}

/// Storage directory: flag, then `INKPAD_DATA_DIR`, then config, then the
/// platform data directory.
pub fn resolve_data_dir(
    cli_data_dir: Option<PathBuf>,
    config: &AppConfig,
) -> Result<PathBuf, CliError> {
    cli_data_dir
        .or_else(|| env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .or_else(|| config.data_dir.clone())
        .or_else(default_data_dir)
        .ok_or_else(|| CliError::Config("Failed to resolve a data directory".to_string()))
}

pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("inkpad"))
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Resolve a full id or a unique id prefix to a note id.
pub fn resolve_note_id(notes: &[Note], note_query: &str) -> Result<NoteId, CliError> {
    let note_query = normalize_note_identifier(note_query)?;
    if let Some(note) = notes.iter().find(|note| note.id.as_str() == note_query) {
        return Ok(note.id.clone());
    }

    let matching = notes
        .iter()
        .filter(|note| note.id.as_str().starts_with(&note_query))
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::NoteNotFound(note_query)),
        [note] => Ok(note.id.clone()),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|note| note.id.as_str())
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{note_query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

const MIN_SHORT_ID_LEN: usize = 13;

pub fn short_id(id: &NoteId, len: usize) -> String {
    id.as_str().chars().take(len).collect()
}

/// Shortest prefix length, at least [`MIN_SHORT_ID_LEN`], that tells every
/// listed id apart.
///
/// UUID v7 ids created in the same millisecond share their first 13
/// characters, so the width grows until the listed ids differ.
pub fn short_id_len(notes: &[&Note]) -> usize {
    let mut ids: Vec<&str> = notes.iter().map(|note| note.id.as_str()).collect();
    ids.sort_unstable();
    ids.windows(2)
        .map(|pair| {
            let shared = pair[0]
                .chars()
                .zip(pair[1].chars())
                .take_while(|(a, b)| a == b)
                .count();
            shared + 1
        })
        .fold(MIN_SHORT_ID_LEN, usize::max)
}

pub fn format_note_lines(notes: &[&Note]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    let id_len = short_id_len(notes);
    notes
        .iter()
        .map(|note| {
            let short_id = short_id(&note.id, id_len);
            let title = truncate_chars(&note.title, 30);
            let preview = note_preview(note, 40);
            let relative_time = format_relative_time(note.update_time, now_ms);
            format!("{short_id:<id_len$}  {title:<30}  {preview:<40}  {relative_time}")
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    let now_ms = Utc::now().timestamp_millis();
    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        preview: note_preview(note, 80),
        content: note.content.clone(),
        create_time: note.create_time,
        update_time: note.update_time,
        relative_time: format_relative_time(note.update_time, now_ms),
    }
}

/// First non-blank content line with whitespace collapsed.
pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note
        .content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, max_chars)
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = text.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Content from the command line, or piped stdin when none was given.
pub fn resolve_note_content(content_parts: &[String]) -> Result<Option<String>, CliError> {
    if !content_parts.is_empty() {
        return Ok(Some(content_parts.join(" ")));
    }
    read_piped_stdin()
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(Some(buffer))
}

pub fn capture_editor_input_with_initial(initial_content: &str) -> Result<String, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(note_content)
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("inkpad-note-{}-{now}.md", std::process::id()))
}

pub fn format_toast(state: &ToastState) -> String {
    let label = match state.kind {
        ToastKind::Success => "ok",
        ToastKind::Error => "error",
        ToastKind::Info => "info",
    };
    format!("[{label}] {}", state.message)
}

/// Print each visible toast to stderr until every toaster clone is dropped.
pub fn spawn_toast_printer(toaster: &Toaster) -> JoinHandle<()> {
    let mut updates = toaster.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if state.visible {
                eprintln!("{}", format_toast(&state));
            }
        }
    })
}
