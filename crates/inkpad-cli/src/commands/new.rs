use inkpad_core::NoteUpdate;

use crate::commands::common::{resolve_note_content, Context};
use crate::error::CliError;

pub fn run_new(
    title: Option<String>,
    content_parts: &[String],
    ctx: &Context,
) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;

    let mut store = ctx.open_store();
    let id = store.add_note();
    let update = NoteUpdate { title, content };
    if !update.is_empty() {
        store.update_note(&id, update);
    }
    if store.save_failed() {
        return Err(CliError::SaveFailed(ctx.data_dir.clone()));
    }

    println!("{id}");
    Ok(())
}
