//! Shared utility functions used across multiple modules.

/// Characters that cannot appear in a file name on common platforms.
pub const RESERVED_FILE_NAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// File stem used when a note has an empty title.
pub const UNTITLED_FILE_STEM: &str = "Untitled";

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Replace every reserved file name character with `_`.
///
/// All other characters are preserved. An empty title becomes
/// [`UNTITLED_FILE_STEM`].
pub fn sanitize_file_stem(title: &str) -> String {
    if title.is_empty() {
        return UNTITLED_FILE_STEM.to_string();
    }

    title
        .chars()
        .map(|ch| {
            if RESERVED_FILE_NAME_CHARS.contains(&ch) {
                '_'
            } else {
                ch
            }
        })
        .collect()
}

/// Build `<sanitized title>.<extension>`.
pub fn export_file_name(title: &str, extension: &str) -> String {
    format!("{}.{extension}", sanitize_file_stem(title))
}

/// Current Unix timestamp in milliseconds.
pub fn unix_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Parse a `#rrggbb` hex color.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}
