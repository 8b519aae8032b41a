use std::io::{self, Write};

use crate::commands::common::{resolve_note_id, Context};
use crate::error::CliError;

pub fn run_show(id: &str, ctx: &Context) -> Result<(), CliError> {
    let store = ctx.open_store();
    let note_id = resolve_note_id(store.notes(), id)?;
    let Some(note) = store.get(&note_id) else {
        return Err(CliError::NoteNotFound(id.to_string()));
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(note.content.as_bytes())?;
    if !note.content.is_empty() && !note.content.ends_with('\n') {
        writeln!(stdout)?;
    }
    Ok(())
}
