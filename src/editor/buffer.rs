use std::ops::Range;

use thiserror::Error;

use crate::normalize::{has_line_break, normalize};
use crate::style::Attributes;

/// Stable identity of a line. Never reused within one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId(u64);

impl std::fmt::Display for LineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Cursor position in the line buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// The line the cursor sits in.
    pub line: LineId,
    /// Byte offset within the line's text.
    pub offset: usize,
}

impl Cursor {
    /// Create a cursor at a specific position.
    pub const fn at(line: LineId, offset: usize) -> Self {
        Self { line, offset }
    }
}

/// One logical row of user content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    id: LineId,
    text: String,
    attributes: Attributes,
}

impl Line {
    pub const fn id(&self) -> LineId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// A mutation record delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The text content of an existing line changed.
    TextEdited(LineId),
    LineInserted(LineId),
    LineRemoved(LineId),
}

impl Change {
    pub const fn line(&self) -> LineId {
        match self {
            Self::TextEdited(id) | Self::LineInserted(id) | Self::LineRemoved(id) => *id,
        }
    }
}

/// Receives batches of change records from a [`LineBuffer`].
pub trait BufferListener {
    /// Called once per flushed batch, records in the order they happened.
    fn on_changes(&mut self, buffer: &mut LineBuffer, changes: &[Change]);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("line {0:?} does not exist")]
    UnknownLine(LineId),

    #[error("text for a single line must not contain line breaks")]
    LineBreak,
}

/// Ordered sequence of lines with change notification.
///
/// Edits are addressed by [`LineId`] and byte offset. Every edit queues a
/// [`Change`]; [`LineBuffer::flush`] hands the queued records to the
/// subscribed listeners as one batch.
#[derive(Default)]
pub struct LineBuffer {
    lines: Vec<Line>,
    next_id: u64,
    pending: Vec<Change>,
    listeners: Vec<Box<dyn BufferListener>>,
}

impl LineBuffer {
    /// Create a buffer with no lines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer from line texts. Texts containing line breaks are
    /// split into several lines. Construction records no changes.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut buffer = Self::new();
        for text in lines {
            let text = text.into();
            if has_line_break(&text) {
                for part in normalize(&text) {
                    buffer.push_line(part);
                }
            } else {
                buffer.push_line(text);
            }
        }
        buffer
    }

    /// Create a buffer from raw multi-line text.
    pub fn from_text(raw: &str) -> Self {
        Self::from_lines(normalize(raw))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.iter().find(|line| line.id == id)
    }

    pub fn line_at(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn index_of(&self, id: LineId) -> Option<usize> {
        self.lines.iter().position(|line| line.id == id)
    }

    /// Line texts in order.
    pub fn texts(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.text.clone()).collect()
    }

    /// The full text, lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Clamp a cursor to its line and snap it to a char boundary.
    ///
    /// Returns `None` if the cursor's line no longer exists.
    pub fn resolve(&self, cursor: Cursor) -> Option<Cursor> {
        let line = self.line(cursor.line)?;
        Some(Cursor::at(
            cursor.line,
            floor_char_boundary(&line.text, cursor.offset),
        ))
    }

    /// Insert `text` at `offset` in a line. Returns the offset just after the
    /// inserted text.
    ///
    /// # Errors
    /// Fails if the line does not exist or `text` contains a line break.
    pub fn insert_str(&mut self, id: LineId, offset: usize, text: &str) -> Result<usize, BufferError> {
        if has_line_break(text) {
            return Err(BufferError::LineBreak);
        }
        let line = self.line_mut(id)?;
        let offset = floor_char_boundary(&line.text, offset);
        if text.is_empty() {
            return Ok(offset);
        }
        line.text.insert_str(offset, text);
        self.pending.push(Change::TextEdited(id));
        Ok(offset + text.len())
    }

    /// Delete a byte range from a line. The range is clamped to the line and
    /// snapped to char boundaries; an empty range is a no-op.
    ///
    /// # Errors
    /// Fails if the line does not exist.
    pub fn delete_range(&mut self, id: LineId, range: Range<usize>) -> Result<(), BufferError> {
        let line = self.line_mut(id)?;
        let start = floor_char_boundary(&line.text, range.start);
        let end = floor_char_boundary(&line.text, range.end);
        if start >= end {
            return Ok(());
        }
        line.text.replace_range(start..end, "");
        self.pending.push(Change::TextEdited(id));
        Ok(())
    }

    /// Replace the whole text of a line.
    ///
    /// # Errors
    /// Fails if the line does not exist or `text` contains a line break.
    pub fn set_text(&mut self, id: LineId, text: &str) -> Result<(), BufferError> {
        if has_line_break(text) {
            return Err(BufferError::LineBreak);
        }
        let line = self.line_mut(id)?;
        if line.text == text {
            return Ok(());
        }
        text.clone_into(&mut line.text);
        self.pending.push(Change::TextEdited(id));
        Ok(())
    }

    /// Insert a new line at `index` (clamped to the end of the buffer).
    ///
    /// # Errors
    /// Fails if `text` contains a line break.
    pub fn insert_line(&mut self, index: usize, text: &str) -> Result<LineId, BufferError> {
        if has_line_break(text) {
            return Err(BufferError::LineBreak);
        }
        let line = self.new_line(text.to_string(), Attributes::new());
        let id = line.id;
        let index = index.min(self.lines.len());
        self.lines.insert(index, line);
        self.pending.push(Change::LineInserted(id));
        Ok(id)
    }

    /// Split a line at `offset` (Enter key). The tail moves into a new line
    /// directly below, which starts with the split line's attributes.
    ///
    /// # Errors
    /// Fails if the line does not exist.
    pub fn split_line(&mut self, id: LineId, offset: usize) -> Result<LineId, BufferError> {
        let index = self.index_of(id).ok_or(BufferError::UnknownLine(id))?;
        let line = &mut self.lines[index];
        let offset = floor_char_boundary(&line.text, offset);
        let tail = line.text.split_off(offset);
        let attributes = line.attributes.clone();
        if !tail.is_empty() {
            self.pending.push(Change::TextEdited(id));
        }
        let new_line = self.new_line(tail, attributes);
        let new_id = new_line.id;
        self.lines.insert(index + 1, new_line);
        self.pending.push(Change::LineInserted(new_id));
        Ok(new_id)
    }

    /// Remove a line. Cursors pointing into it become stale.
    ///
    /// # Errors
    /// Fails if the line does not exist.
    pub fn remove_line(&mut self, id: LineId) -> Result<Line, BufferError> {
        let index = self.index_of(id).ok_or(BufferError::UnknownLine(id))?;
        let line = self.lines.remove(index);
        self.pending.push(Change::LineRemoved(id));
        Ok(line)
    }

    /// Set display attributes. Not a content change, so nothing is recorded.
    ///
    /// # Errors
    /// Fails if the line does not exist.
    pub fn set_attributes(&mut self, id: LineId, attributes: Attributes) -> Result<(), BufferError> {
        self.line_mut(id)?.attributes = attributes;
        Ok(())
    }

    /// Records queued since the last flush.
    pub fn pending_changes(&self) -> &[Change] {
        &self.pending
    }

    /// Register a listener. Listeners run in subscription order.
    pub fn subscribe(&mut self, listener: Box<dyn BufferListener>) {
        self.listeners.push(listener);
    }

    /// Deliver queued records to every listener as one batch.
    ///
    /// Records produced by listeners while handling the batch are queued for
    /// the next flush. Returns the number of records delivered.
    pub fn flush(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let batch = std::mem::take(&mut self.pending);
        let mut listeners = std::mem::take(&mut self.listeners);
        for listener in &mut listeners {
            listener.on_changes(self, &batch);
        }
        // Keep listeners subscribed during delivery, after the existing ones.
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
        batch.len()
    }

    // --- Private helpers ---

    fn line_mut(&mut self, id: LineId) -> Result<&mut Line, BufferError> {
        self.lines
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or(BufferError::UnknownLine(id))
    }

    fn new_line(&mut self, text: String, attributes: Attributes) -> Line {
        let id = LineId(self.next_id);
        self.next_id += 1;
        Line {
            id,
            text,
            attributes,
        }
    }

    fn push_line(&mut self, text: String) {
        let line = self.new_line(text, Attributes::new());
        self.lines.push(line);
    }
}

impl std::fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineBuffer")
            .field("lines", &self.lines)
            .field("pending", &self.pending)
            .field("listeners", &format_args!("{} listeners", self.listeners.len()))
            .finish_non_exhaustive()
    }
}

/// Largest char boundary in `text` that is `<= offset`.
fn floor_char_boundary(text: &str, offset: usize) -> usize {
    if offset >= text.len() {
        return text.len();
    }
    (0..=offset)
        .rev()
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::style::{AttrValue, FontWeight};

    fn first_id(buf: &LineBuffer) -> LineId {
        buf.line_at(0).unwrap().id()
    }

    /// Records every batch it receives.
    struct Recorder(Rc<RefCell<Vec<Vec<Change>>>>);

    impl BufferListener for Recorder {
        fn on_changes(&mut self, _buffer: &mut LineBuffer, changes: &[Change]) {
            self.0.borrow_mut().push(changes.to_vec());
        }
    }

    // --- Construction and basic queries ---

    #[test]
    fn test_new_buffer_is_empty() {
        let buf = LineBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.text(), "");
    }

    #[test]
    fn test_from_text_preserves_content() {
        let buf = LineBuffer::from_text("hello\r\nworld");
        assert_eq!(buf.texts(), ["hello", "world"]);
        assert_eq!(buf.text(), "hello\nworld");
    }

    #[test]
    fn test_from_lines_splits_embedded_breaks() {
        let buf = LineBuffer::from_lines(["a\nb", "c"]);
        assert_eq!(buf.texts(), ["a", "b", "c"]);
    }

    #[test]
    fn test_construction_records_nothing() {
        let buf = LineBuffer::from_lines(["a", "b"]);
        assert!(buf.pending_changes().is_empty());
    }

    #[test]
    fn test_line_ids_are_unique() {
        let mut buf = LineBuffer::from_lines(["a", "b"]);
        let removed = buf.remove_line(first_id(&buf)).unwrap().id();
        let added = buf.insert_line(0, "c").unwrap();
        assert_ne!(removed, added);
        assert_eq!(buf.index_of(added), Some(0));
    }

    // --- Text edits ---

    #[test]
    fn test_insert_str_in_middle() {
        let mut buf = LineBuffer::from_lines(["hd"]);
        let id = first_id(&buf);
        let end = buf.insert_str(id, 1, "ello worl").unwrap();
        assert_eq!(buf.line(id).unwrap().text(), "hello world");
        assert_eq!(end, 10);
        assert_eq!(buf.pending_changes(), [Change::TextEdited(id)]);
    }

    #[test]
    fn test_insert_str_empty_is_noop() {
        let mut buf = LineBuffer::from_lines(["hello"]);
        let id = first_id(&buf);
        assert_eq!(buf.insert_str(id, 2, "").unwrap(), 2);
        assert!(buf.pending_changes().is_empty());
    }

    #[test]
    fn test_insert_str_rejects_line_break() {
        let mut buf = LineBuffer::from_lines(["hello"]);
        let id = first_id(&buf);
        assert_eq!(buf.insert_str(id, 0, "a\nb"), Err(BufferError::LineBreak));
        assert_eq!(buf.texts(), ["hello"]);
    }

    #[test]
    fn test_insert_str_snaps_inside_multibyte_char() {
        let mut buf = LineBuffer::from_lines(["café"]);
        let id = first_id(&buf);
        // Offset 4 is inside 'é'.
        buf.insert_str(id, 4, "!").unwrap();
        assert_eq!(buf.line(id).unwrap().text(), "caf!é");
    }

    #[test]
    fn test_insert_str_offset_past_end_appends() {
        let mut buf = LineBuffer::from_lines(["ab"]);
        let id = first_id(&buf);
        buf.insert_str(id, 99, "c").unwrap();
        assert_eq!(buf.line(id).unwrap().text(), "abc");
    }

    #[test]
    fn test_delete_range_clamps() {
        let mut buf = LineBuffer::from_lines(["hello"]);
        let id = first_id(&buf);
        buf.delete_range(id, 3..100).unwrap();
        assert_eq!(buf.line(id).unwrap().text(), "hel");
    }

    #[test]
    fn test_delete_empty_range_is_noop() {
        let mut buf = LineBuffer::from_lines(["hello"]);
        let id = first_id(&buf);
        buf.delete_range(id, 2..2).unwrap();
        assert!(buf.pending_changes().is_empty());
    }

    #[test]
    fn test_set_text_same_value_records_nothing() {
        let mut buf = LineBuffer::from_lines(["same"]);
        let id = first_id(&buf);
        buf.set_text(id, "same").unwrap();
        assert!(buf.pending_changes().is_empty());
        buf.set_text(id, "other").unwrap();
        assert_eq!(buf.pending_changes(), [Change::TextEdited(id)]);
    }

    #[test]
    fn test_edit_unknown_line_fails() {
        let mut buf = LineBuffer::from_lines(["a"]);
        let id = first_id(&buf);
        buf.remove_line(id).unwrap();
        assert_eq!(
            buf.insert_str(id, 0, "x"),
            Err(BufferError::UnknownLine(id))
        );
    }

    // --- Structure edits ---

    #[test]
    fn test_split_line_in_middle() {
        let mut buf = LineBuffer::from_lines(["hello world"]);
        let id = first_id(&buf);
        let new_id = buf.split_line(id, 5).unwrap();
        assert_eq!(buf.texts(), ["hello", " world"]);
        assert_eq!(
            buf.pending_changes(),
            [Change::TextEdited(id), Change::LineInserted(new_id)]
        );
    }

    #[test]
    fn test_split_line_at_end_only_inserts() {
        let mut buf = LineBuffer::from_lines(["hello"]);
        let id = first_id(&buf);
        let new_id = buf.split_line(id, 5).unwrap();
        assert_eq!(buf.texts(), ["hello", ""]);
        assert_eq!(buf.pending_changes(), [Change::LineInserted(new_id)]);
    }

    #[test]
    fn test_split_line_copies_attributes() {
        let mut buf = LineBuffer::from_lines(["|key value"]);
        let id = first_id(&buf);
        let bold = Attributes::new().with(AttrValue::FontWeight(FontWeight::Bold));
        buf.set_attributes(id, bold.clone()).unwrap();
        let new_id = buf.split_line(id, 4).unwrap();
        assert_eq!(buf.line(new_id).unwrap().attributes(), &bold);
    }

    #[test]
    fn test_insert_line_clamps_index() {
        let mut buf = LineBuffer::from_lines(["a"]);
        buf.insert_line(10, "b").unwrap();
        assert_eq!(buf.texts(), ["a", "b"]);
    }

    #[test]
    fn test_set_attributes_records_nothing() {
        let mut buf = LineBuffer::from_lines(["a"]);
        let id = first_id(&buf);
        buf.set_attributes(id, Attributes::new()).unwrap();
        assert!(buf.pending_changes().is_empty());
    }

    // --- Cursor resolution ---

    #[test]
    fn test_resolve_clamps_offset() {
        let buf = LineBuffer::from_lines(["abc"]);
        let id = first_id(&buf);
        assert_eq!(buf.resolve(Cursor::at(id, 50)), Some(Cursor::at(id, 3)));
    }

    #[test]
    fn test_resolve_removed_line_is_none() {
        let mut buf = LineBuffer::from_lines(["abc", "def"]);
        let id = first_id(&buf);
        buf.remove_line(id).unwrap();
        assert_eq!(buf.resolve(Cursor::at(id, 0)), None);
    }

    // --- Notification ---

    #[test]
    fn test_flush_delivers_one_batch_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut buf = LineBuffer::from_lines(["a"]);
        buf.subscribe(Box::new(Recorder(Rc::clone(&seen))));
        let id = first_id(&buf);

        buf.insert_str(id, 1, "b").unwrap();
        let new_id = buf.insert_line(1, "c").unwrap();
        assert_eq!(buf.flush(), 2);

        assert_eq!(
            *seen.borrow(),
            [vec![Change::TextEdited(id), Change::LineInserted(new_id)]]
        );
        assert!(buf.pending_changes().is_empty());
    }

    #[test]
    fn test_flush_without_changes_delivers_nothing() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut buf = LineBuffer::from_lines(["a"]);
        buf.subscribe(Box::new(Recorder(Rc::clone(&seen))));
        assert_eq!(buf.flush(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_listener_edits_go_to_next_batch() {
        struct Uppercaser;
        impl BufferListener for Uppercaser {
            fn on_changes(&mut self, buffer: &mut LineBuffer, changes: &[Change]) {
                for change in changes {
                    if let Change::TextEdited(id) = change {
                        let upper = buffer.line(*id).unwrap().text().to_uppercase();
                        buffer.set_text(*id, &upper).unwrap();
                    }
                }
            }
        }

        let mut buf = LineBuffer::from_lines(["a"]);
        buf.subscribe(Box::new(Uppercaser));
        let id = first_id(&buf);
        buf.insert_str(id, 1, "b").unwrap();
        buf.flush();

        assert_eq!(buf.texts(), ["AB"]);
        assert_eq!(buf.pending_changes(), [Change::TextEdited(id)]);
    }

    #[test]
    fn test_floor_char_boundary() {
        assert_eq!(floor_char_boundary("café", 4), 3);
        assert_eq!(floor_char_boundary("café", 5), 5);
        assert_eq!(floor_char_boundary("", 3), 0);
    }
}
