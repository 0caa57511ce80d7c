//! Indent and outdent at the cursor.
//!
//! Outdent only ever touches the line's leading whitespace. It removes, in
//! order of preference:
//! 1. the leftmost occurrence of the indentation unit inside that leading run, or
//! 2. a run of one or two whitespace characters at the start of the line.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::buffer::{Cursor, LineBuffer};
use super::error::EditError;

/// Two non-breaking spaces.
pub const DEFAULT_INDENT_UNIT: &str = "\u{a0}\u{a0}";

static LEADING_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s{1,2}").expect("leading whitespace pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDirection {
    Indent,
    Outdent,
}

/// Insert or remove one indentation unit on the cursor's line.
///
/// Returns the cursor to use after the operation, always within the line.
///
/// # Errors
/// [`EditError::NoCursor`] without a cursor, [`EditError::StaleCursor`] if
/// its line is gone. The buffer is untouched in both cases.
pub fn shift(
    buffer: &mut LineBuffer,
    cursor: Option<Cursor>,
    unit: &str,
    direction: ShiftDirection,
) -> Result<Cursor, EditError> {
    let cursor = cursor.ok_or(EditError::NoCursor)?;
    let cursor = buffer
        .resolve(cursor)
        .ok_or(EditError::StaleCursor(cursor.line))?;

    match direction {
        ShiftDirection::Indent => {
            let offset = buffer.insert_str(cursor.line, cursor.offset, unit)?;
            Ok(Cursor::at(cursor.line, offset))
        }
        ShiftDirection::Outdent => {
            let text = buffer
                .line(cursor.line)
                .map(|line| line.text().to_string())
                .unwrap_or_default();
            let Some(removed) = outdent_range(&text, unit) else {
                return Ok(cursor);
            };
            buffer.delete_range(cursor.line, removed.clone())?;

            let offset = if cursor.offset >= removed.end {
                cursor.offset - removed.len()
            } else {
                cursor.offset.min(removed.start)
            };
            buffer
                .resolve(Cursor::at(cursor.line, offset))
                .ok_or(EditError::StaleCursor(cursor.line))
        }
    }
}

pub fn indent(buffer: &mut LineBuffer, cursor: Option<Cursor>, unit: &str) -> Result<Cursor, EditError> {
    shift(buffer, cursor, unit, ShiftDirection::Indent)
}

pub fn outdent(buffer: &mut LineBuffer, cursor: Option<Cursor>, unit: &str) -> Result<Cursor, EditError> {
    shift(buffer, cursor, unit, ShiftDirection::Outdent)
}

fn outdent_range(text: &str, unit: &str) -> Option<Range<usize>> {
    let leading = &text[..text.len() - text.trim_start().len()];
    if !unit.is_empty()
        && let Some(start) = leading.find(unit)
    {
        return Some(start..start + unit.len());
    }
    LEADING_WHITESPACE.find(text).map(|m| m.range())
}
