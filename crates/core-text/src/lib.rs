//! Line-oriented text storage addressed by (row, codepoint column).
//!
//! A [`Document`] is an ordered, never-empty sequence of [`Line`]s. All mutators take codepoint
//! positions; column/byte translation is delegated to [`unicode`], which reads ropey's index.
//! Every mutator validates its position before touching any line, so a rejected call leaves the
//! document exactly as it was.

use ropey::{Rope, RopeSlice};
use std::borrow::Cow;
use std::ops::Range;
use thiserror::Error;
use tracing::trace;

pub mod search;
pub mod unicode;

/// Failure of a positional or argument check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("row {row} out of range (line count {line_count})")]
    RowOutOfRange { row: usize, line_count: usize },
    #[error("column {column} out of range on row {row} (line length {len})")]
    OutOfRange { row: usize, column: usize, len: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Closed set of error classes surfaced across the engine boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    OutOfRange,
    InvalidArgument,
    Io,
}

impl TextError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TextError::RowOutOfRange { .. } | TextError::OutOfRange { .. } => ErrorKind::OutOfRange,
            TextError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }
}

pub type Result<T, E = TextError> = std::result::Result<T, E>;

/// A position expressed as (row, codepoint column).
///
/// Ordering is row-major, which is the document order used by search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
    pub const fn origin() -> Self {
        Self { row: 0, column: 0 }
    }
}

/// One line of text, held in its own rope so columns map to bytes through ropey's index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    rope: Rope,
}

impl Line {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    pub fn slice(&self) -> RopeSlice<'_> {
        self.rope.slice(..)
    }

    /// Line content; borrowed when the rope holds it in a single chunk.
    pub fn text(&self) -> Cow<'_, str> {
        self.slice().into()
    }

    pub fn byte_len(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn unicode_len(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, column: usize, text: &str) {
        self.rope.insert(column, text);
    }

    fn remove(&mut self, columns: Range<usize>) -> String {
        let removed = self.rope.slice(columns.clone()).to_string();
        self.rope.remove(columns);
        removed
    }

    fn split_off(&mut self, column: usize) -> Line {
        Line {
            rope: self.rope.split_off(column),
        }
    }

    fn append(&mut self, other: Line) {
        self.rope.append(other.rope);
    }
}

/// The text of one buffer.
///
/// Rows are kept apart rather than in one rope: a line may carry a literal `\n` from
/// [`Document::insert_text`], which a single rope would read as a row break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<Line>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document holding a single empty line.
    pub fn new() -> Self {
        Self {
            lines: vec![Line::default()],
        }
    }

    /// Build from pre-split lines. An empty iterator still yields one empty line.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines: Vec<Line> = lines.into_iter().map(|l| Line::new(l.as_ref())).collect();
        if lines.is_empty() {
            lines.push(Line::default());
        }
        Self { lines }
    }

    /// Split `content` on `terminator`. A trailing terminator yields a final empty line, so
    /// [`Document::join`] with the same terminator reproduces `content` exactly.
    pub fn from_text(content: &str, terminator: &str) -> Self {
        Self::from_lines(content.split(terminator))
    }

    /// All lines joined by `terminator`, with nothing appended after the last line.
    pub fn join(&self, terminator: &str) -> String {
        let mut out = String::with_capacity(self.byte_len() + self.lines.len() * terminator.len());
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push_str(terminator);
            }
            out.extend(line.rope.chunks());
        }
        out
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total bytes across all lines, terminators excluded.
    pub fn byte_len(&self) -> usize {
        self.lines.iter().map(Line::byte_len).sum()
    }

    pub fn lines(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.lines.iter().map(Line::text)
    }

    pub fn line(&self, row: usize) -> Result<Cow<'_, str>> {
        self.line_ref(row).map(Line::text)
    }

    pub fn line_ref(&self, row: usize) -> Result<&Line> {
        self.lines.get(row).ok_or(TextError::RowOutOfRange {
            row,
            line_count: self.lines.len(),
        })
    }

    pub fn unicode_len(&self, row: usize) -> Result<usize> {
        self.line_ref(row).map(Line::unicode_len)
    }

    fn out_of_range(line: &Line, pos: Position) -> TextError {
        TextError::OutOfRange {
            row: pos.row,
            column: pos.column,
            len: line.unicode_len(),
        }
    }

    /// Validate `pos` and return the byte offset it maps to.
    pub fn byte_offset(&self, pos: Position) -> Result<usize> {
        let line = self.line_ref(pos.row)?;
        unicode::byte_offset(line.slice(), pos.column).ok_or_else(|| Self::out_of_range(line, pos))
    }

    pub fn check(&self, pos: Position) -> Result<()> {
        self.byte_offset(pos).map(|_| ())
    }

    /// Insert `text` at `pos`. Terminator characters inside `text` are stored literally.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Result<()> {
        self.check(pos)?;
        self.lines[pos.row].insert(pos.column, text);
        trace!(target: "text", row = pos.row, column = pos.column, size_bytes = text.len(), "insert_text");
        Ok(())
    }

    /// Remove up to `count` codepoints starting at `pos`, clamped to the end of the line.
    /// Returns the removed text.
    pub fn delete_text(&mut self, pos: Position, count: usize) -> Result<String> {
        let line = self.line_ref(pos.row)?;
        let columns = unicode::char_range(line.slice(), pos.column, count)
            .ok_or_else(|| Self::out_of_range(line, pos))?;
        let removed = self.lines[pos.row].remove(columns);
        trace!(target: "text", row = pos.row, column = pos.column, requested = count, size_bytes = removed.len(), "delete_text");
        Ok(removed)
    }

    /// Move the suffix of `pos.row` starting at `pos.column` onto a new line right after it.
    pub fn split_line(&mut self, pos: Position) -> Result<()> {
        self.check(pos)?;
        let tail = self.lines[pos.row].split_off(pos.column);
        self.lines.insert(pos.row + 1, tail);
        trace!(target: "text", row = pos.row, column = pos.column, lines = self.lines.len(), "split_line");
        Ok(())
    }

    /// Append line `row` onto `row - 1` and remove it. Returns the codepoint length line
    /// `row - 1` had before the join (the column where the two lines meet).
    pub fn join_lines(&mut self, row: usize) -> Result<usize> {
        if row == 0 || row >= self.lines.len() {
            return Err(TextError::RowOutOfRange {
                row,
                line_count: self.lines.len(),
            });
        }
        let line = self.lines.remove(row);
        let prev = &mut self.lines[row - 1];
        let joined_at = prev.unicode_len();
        prev.append(line);
        trace!(target: "text", row, joined_at, lines = self.lines.len(), "join_lines");
        Ok(joined_at)
    }

    /// Copy up to `count` codepoints starting at `pos` (clamped to the line end).
    pub fn slice(&self, pos: Position, count: usize) -> Result<String> {
        let line = self.line_ref(pos.row)?;
        let columns = unicode::char_range(line.slice(), pos.column, count)
            .ok_or_else(|| Self::out_of_range(line, pos))?;
        Ok(line.rope.slice(columns).to_string())
    }

    /// Text between two positions (order-insensitive), lines joined with `\n`.
    pub fn text_between(&self, a: Position, b: Position) -> Result<String> {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        self.check(start)?;
        self.check(end)?;
        if start.row == end.row {
            return Ok(self.lines[start.row]
                .rope
                .slice(start.column..end.column)
                .to_string());
        }
        let mut out = self.lines[start.row].rope.slice(start.column..).to_string();
        for line in &self.lines[start.row + 1..end.row] {
            out.push('\n');
            out.extend(line.rope.chunks());
        }
        out.push('\n');
        out.extend(self.lines[end.row].rope.slice(..end.column).chunks());
        Ok(out)
    }

    /// Position just past the end of `text` when inserted at `pos` without splitting.
    pub fn advance(pos: Position, text: &str) -> Position {
        Position::new(pos.row, pos.column + unicode::char_len(text))
    }
}
