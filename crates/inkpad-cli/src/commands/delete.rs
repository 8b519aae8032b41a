use crate::commands::common::{resolve_note_id, Context};
use crate::error::CliError;

pub fn run_delete(id: &str, ctx: &Context) -> Result<(), CliError> {
    let mut store = ctx.open_store();
    let note_id = resolve_note_id(store.notes(), id)?;

    if !store.delete_note(&note_id) {
        return Err(CliError::NoteNotFound(id.to_string()));
    }
    if store.save_failed() {
        return Err(CliError::SaveFailed(ctx.data_dir.clone()));
    }
    println!("{note_id}");
    Ok(())
}
