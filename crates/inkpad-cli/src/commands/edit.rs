use inkpad_core::NoteUpdate;

use crate::commands::common::{capture_editor_input_with_initial, resolve_note_id, Context};
use crate::error::CliError;

pub fn run_edit(
    id: &str,
    title: Option<String>,
    content: Option<String>,
    ctx: &Context,
) -> Result<(), CliError> {
    let mut store = ctx.open_store();
    let note_id = resolve_note_id(store.notes(), id)?;

    let update = if title.is_none() && content.is_none() {
        let Some(note) = store.get(&note_id) else {
            return Err(CliError::NoteNotFound(id.to_string()));
        };
        let edited_content = capture_editor_input_with_initial(&note.content)?;
        if edited_content == note.content {
            println!("{note_id}");
            return Ok(());
        }
        NoteUpdate {
            title: None,
            content: Some(edited_content),
        }
    } else {
        NoteUpdate { title, content }
    };

    let Some(updated) = store.update_note(&note_id, update) else {
        return Err(CliError::NoteNotFound(id.to_string()));
    };
    let updated_id = updated.id.clone();
    if store.save_failed() {
        return Err(CliError::SaveFailed(ctx.data_dir.clone()));
    }
    println!("{updated_id}");
    Ok(())
}
