//! The editing surface: a line buffer wired to the change pipeline.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, error, warn};

use super::buffer::{Cursor, LineBuffer};
use super::error::EditError;
use super::indent::{DEFAULT_INDENT_UNIT, ShiftDirection, shift};
use crate::pipeline::ChangePipeline;
use crate::store::{KeyValueStore, SnapshotStore};
use crate::style::Classifier;

/// Content shown when there is no saved session.
pub const SEED_LINES: &[&str] = &[
    r#"|KEY - Use a vertical pipe to make "header""#,
    "todo - item that needs doing",
    "redo - fix this item",
    "info - information for later reference",
    "talk - item to discuss with team member",
    "task - assignable task for an individual",
    "idea - note on where in a process an item was left to aid in jumping back in",
    "*todo - asterisk notes a line item is finished.",
    "",
    "info: prefix the line with one of the above keywords, organize by indenting with tabs, shift-tab also works!",
];

/// Result of offering a key press to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key was consumed; its default insertion must not happen.
    Handled,
    Ignored,
}

/// A live editing session.
///
/// Every mutation made through the session is flushed immediately, so the
/// pipeline persists and restyles before the call returns.
#[derive(Debug)]
pub struct Session {
    buffer: LineBuffer,
    cursor: Option<Cursor>,
    indent_unit: String,
}

impl Session {
    /// Load the saved lines (or the seed content), style them, and attach a
    /// [`ChangePipeline`] that takes over `store`.
    ///
    /// A missing or unreadable snapshot falls back to [`SEED_LINES`].
    pub fn open<S>(store: SnapshotStore<S>, classifier: Classifier) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let lines = match store.load() {
            Ok(Some(lines)) => lines,
            Ok(None) => {
                debug!(key = store.key(), "no saved session, using seed content");
                seed_lines()
            }
            Err(err) => {
                warn!(%err, "saved session unreadable, using seed content");
                seed_lines()
            }
        };

        let mut buffer = LineBuffer::from_lines(lines);
        style_all(&mut buffer, &classifier);
        buffer.subscribe(Box::new(ChangePipeline::new(classifier, store)));

        Self {
            buffer,
            cursor: None,
            indent_unit: DEFAULT_INDENT_UNIT.to_string(),
        }
    }

    /// Use a different indentation unit for Tab / Shift+Tab.
    #[must_use]
    pub fn with_indent_unit(mut self, unit: impl Into<String>) -> Self {
        self.indent_unit = unit.into();
        self
    }

    pub const fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub const fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    pub fn indent_unit(&self) -> &str {
        &self.indent_unit
    }

    /// Set or clear the active cursor.
    pub const fn set_cursor(&mut self, cursor: Option<Cursor>) {
        self.cursor = cursor;
    }

    /// Place the cursor on the line at `index`. Returns `None` (and clears the
    /// cursor) if there is no such line.
    pub fn place_cursor(&mut self, index: usize, offset: usize) -> Option<Cursor> {
        self.cursor = self
            .buffer
            .line_at(index)
            .and_then(|line| self.buffer.resolve(Cursor::at(line.id(), offset)));
        self.cursor
    }

    /// Key-press handler: Tab indents, Shift+Tab outdents.
    ///
    /// # Errors
    /// Propagates [`EditError`] from the indent engine; nothing is mutated then.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<KeyOutcome, EditError> {
        if key.kind == KeyEventKind::Release {
            return Ok(KeyOutcome::Ignored);
        }
        let direction = match key.code {
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => ShiftDirection::Outdent,
            KeyCode::Tab => ShiftDirection::Indent,
            KeyCode::BackTab => ShiftDirection::Outdent,
            _ => return Ok(KeyOutcome::Ignored),
        };
        self.shift(direction)?;
        Ok(KeyOutcome::Handled)
    }

    /// Indent or outdent at the cursor.
    ///
    /// # Errors
    /// [`EditError::NoCursor`] or [`EditError::StaleCursor`].
    pub fn shift(&mut self, direction: ShiftDirection) -> Result<Cursor, EditError> {
        let cursor = shift(&mut self.buffer, self.cursor, &self.indent_unit, direction)?;
        self.cursor = Some(cursor);
        self.buffer.flush();
        Ok(cursor)
    }

    /// Type `text` at the cursor. Line breaks in `text` start new lines.
    ///
    /// # Errors
    /// [`EditError::NoCursor`] or [`EditError::StaleCursor`].
    pub fn type_str(&mut self, text: &str) -> Result<Cursor, EditError> {
        let mut cursor = self.active_cursor()?;
        for (i, part) in crate::normalize::normalize(text).iter().enumerate() {
            if i > 0 {
                let id = self.buffer.split_line(cursor.line, cursor.offset)?;
                cursor = Cursor::at(id, 0);
            }
            let offset = self.buffer.insert_str(cursor.line, cursor.offset, part)?;
            cursor = Cursor::at(cursor.line, offset);
        }
        self.cursor = Some(cursor);
        self.buffer.flush();
        Ok(cursor)
    }

    /// Split the line at the cursor (Enter).
    ///
    /// # Errors
    /// [`EditError::NoCursor`] or [`EditError::StaleCursor`].
    pub fn newline(&mut self) -> Result<Cursor, EditError> {
        let cursor = self.active_cursor()?;
        let id = self.buffer.split_line(cursor.line, cursor.offset)?;
        let cursor = Cursor::at(id, 0);
        self.cursor = Some(cursor);
        self.buffer.flush();
        Ok(cursor)
    }

    /// Delete the character before the cursor, joining with the previous
    /// line at the start of a line (Backspace).
    ///
    /// # Errors
    /// [`EditError::NoCursor`] or [`EditError::StaleCursor`].
    pub fn backspace(&mut self) -> Result<Cursor, EditError> {
        let cursor = self.active_cursor()?;
        let text = self
            .buffer
            .line(cursor.line)
            .map(|line| line.text().to_string())
            .unwrap_or_default();

        let cursor = if cursor.offset > 0 {
            let prev_len = text[..cursor.offset]
                .chars()
                .next_back()
                .map_or(1, char::len_utf8);
            let start = cursor.offset - prev_len;
            self.buffer.delete_range(cursor.line, start..cursor.offset)?;
            Cursor::at(cursor.line, start)
        } else {
            let index = self
                .buffer
                .index_of(cursor.line)
                .ok_or(EditError::StaleCursor(cursor.line))?;
            let Some(prev) = index.checked_sub(1).and_then(|i| self.buffer.line_at(i)) else {
                return Ok(cursor);
            };
            let prev_id = prev.id();
            let join_at = prev.text().len();
            self.buffer.insert_str(prev_id, join_at, &text)?;
            self.buffer.remove_line(cursor.line)?;
            Cursor::at(prev_id, join_at)
        };

        self.cursor = Some(cursor);
        self.buffer.flush();
        Ok(cursor)
    }

    fn active_cursor(&self) -> Result<Cursor, EditError> {
        let cursor = self.cursor.ok_or(EditError::NoCursor)?;
        self.buffer
            .resolve(cursor)
            .ok_or(EditError::StaleCursor(cursor.line))
    }
}

fn seed_lines() -> Vec<String> {
    SEED_LINES.iter().map(ToString::to_string).collect()
}

fn style_all(buffer: &mut LineBuffer, classifier: &Classifier) {
    let ids: Vec<_> = buffer.lines().iter().map(|line| line.id()).collect();
    for id in ids {
        let Some(line) = buffer.line(id) else {
            continue;
        };
        match classifier.classify(line.text()) {
            Ok(attributes) => {
                if let Err(err) = buffer.set_attributes(id, attributes) {
                    warn!(%err, "failed to apply line attributes");
                }
            }
            Err(err) => error!(%err, "line left unstyled"),
        }
    }
}
