use crate::commands::common::{format_note_lines, note_to_list_item, Context, NoteListItem};
use crate::error::CliError;

pub fn run_list(
    search: Option<&str>,
    limit: Option<usize>,
    as_json: bool,
    ctx: &Context,
) -> Result<(), CliError> {
    let mut store = ctx.open_store();
    if let Some(query) = search {
        store.set_search_query(query);
    }

    let mut notes = store.filtered_notes();
    if let Some(limit) = limit {
        notes.truncate(limit);
    }

    if as_json {
        let json_items = notes
            .iter()
            .map(|note| note_to_list_item(note))
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_note_lines(&notes) {
            println!("{line}");
        }
    }

    Ok(())
}
