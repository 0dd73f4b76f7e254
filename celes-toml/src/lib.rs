//! Ini-style TOML reading: a recursive-descent parser over the celes base
//! lexer producing an owned tree of tables, arrays, and scalar values
//! addressable by dotted keys.
//!
//! The supported surface is deliberately partial: no inline arrays or
//! tables, no unicode escapes, no `inf`/`nan`, no dates.

use std::path::Path;

pub use parse::{parse_str, ParseError, ParseOutcome, Parser};
pub use value::{Array, Table, Value, ValueKind};

pub mod map;
pub mod parse;
pub mod value;

#[derive(Debug)]
pub enum OpenError {
    NotFound,
    /// Concatenated diagnostics of a failed parse.
    Parse(String),
}

impl OpenError {
    /// The classic status codes: -1 file not found, -2 parse error.
    pub fn code(&self) -> i32 {
        match self {
            OpenError::NotFound => -1,
            OpenError::Parse(_) => -2,
        }
    }
}

impl std::fmt::Display for OpenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenError::NotFound => f.write_str("file not found"),
            OpenError::Parse(diagnostics) => f.write_str(diagnostics.trim_end()),
        }
    }
}

impl std::error::Error for OpenError {}

/// Reads and parses a TOML file. An empty or BOM-only file yields an empty
/// root table.
pub fn open(path: impl AsRef<Path>) -> Result<Table, OpenError> {
    let path = path.as_ref();
    let text = match celes_common::read_utf8_file(path) {
        Ok(text) => text,
        Err(_) => return Err(OpenError::NotFound),
    };

    let file = path.to_string_lossy();
    let outcome = parse_str(&file, &text);
    match outcome.error {
        None => Ok(outcome.root),
        Some(_) => Err(OpenError::Parse(outcome.report.build_string())),
    }
}
