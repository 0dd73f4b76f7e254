use std::io;
use std::path::Path;

/// Reads an entire file as UTF-8 text, stripping an optional byte-order
/// mark (`EF BB BF`) at the start.
pub fn read_utf8_file(path: impl AsRef<Path>) -> io::Result<String> {
    let mut text = std::fs::read_to_string(path)?;
    if text.starts_with('\u{feff}') {
        text.drain(..3);
    }
    Ok(text)
}
