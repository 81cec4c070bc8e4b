//! Plain, case-sensitive substring search over a [`Document`].
//!
//! Matching happens on line bytes (`str::find`), results are reported as codepoint positions.
//! Matches never span a line boundary.

use crate::{Document, Position, Result, TextError, unicode};
use tracing::debug;

fn require_term(term: &str) -> Result<()> {
    if term.is_empty() {
        return Err(TextError::InvalidArgument("search term must not be empty"));
    }
    Ok(())
}

fn position_at(line: &str, row: usize, byte: usize) -> Position {
    // `str::find` only reports char boundaries.
    Position::new(row, unicode::column_of(line, byte).unwrap_or(0))
}

/// First match at or after `start`, wrapping to the top of the document.
///
/// The start position itself is a candidate. After wrapping, the scan stops once it reaches the
/// start again; a match that begins before the start column on the start row is still reported.
pub fn find_next(doc: &Document, term: &str, start: Position) -> Result<Option<Position>> {
    require_term(term)?;
    let start_byte = doc.byte_offset(start)?;
    let first = doc.line(start.row)?;

    if let Some(b) = first[start_byte..].find(term) {
        return Ok(Some(position_at(&first, start.row, start_byte + b)));
    }
    let rows = (start.row + 1..doc.line_count()).chain(0..start.row);
    for row in rows {
        let line = doc.line(row)?;
        if let Some(b) = line.find(term) {
            let found = position_at(&line, row, b);
            debug!(target: "search", row, column = found.column, wrapped = row < start.row, "find_next_hit");
            return Ok(Some(found));
        }
    }
    // Back on the start row: only the part before the start is left.
    if let Some(b) = first.find(term).filter(|b| *b < start_byte) {
        debug!(target: "search", row = start.row, "find_next_hit_start_row_prefix");
        return Ok(Some(position_at(&first, start.row, b)));
    }
    debug!(target: "search", term_bytes = term.len(), "find_next_exhausted");
    Ok(None)
}

/// Repeat-search variant of [`find_next`]: begins one codepoint past `pos` so a match sitting at
/// `pos` is only reported when nothing else matches.
pub fn find_after(doc: &Document, term: &str, pos: Position) -> Result<Option<Position>> {
    require_term(term)?;
    let len = doc.unicode_len(pos.row)?;
    doc.check(pos)?;
    let next = if pos.column < len {
        Position::new(pos.row, pos.column + 1)
    } else if pos.row + 1 < doc.line_count() {
        Position::new(pos.row + 1, 0)
    } else {
        Position::origin()
    };
    find_next(doc, term, next)
}

/// Byte offsets of every non-overlapping match of `term` in `line`, left to right.
pub fn line_matches(line: &str, term: &str) -> Vec<usize> {
    if term.is_empty() {
        return Vec::new();
    }
    line.match_indices(term).map(|(b, _)| b).collect()
}

/// Every non-overlapping match in document order.
pub fn find_all(doc: &Document, term: &str) -> Result<Vec<Position>> {
    require_term(term)?;
    let mut out = Vec::new();
    for (row, line) in doc.lines().enumerate() {
        out.extend(
            line_matches(&line, term)
                .into_iter()
                .map(|b| position_at(&line, row, b)),
        );
    }
    Ok(out)
}
