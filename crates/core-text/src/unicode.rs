//! Codepoint <-> byte translation for a single line.
//!
//! Every positional operation in the workspace is addressed in codepoints. This module is the
//! only place that turns a codepoint column into a byte offset (or back); callers never slice a
//! line with a byte index they computed themselves.
//!
//! Functions accept anything that converts into a [`RopeSlice`], so stored lines and plain
//! `&str` results (search hits, for one) go through the same ropey index.

use ropey::RopeSlice;
use std::ops::Range;
use unicode_width::UnicodeWidthChar;

/// Number of codepoints in `text`.
pub fn char_len<'a>(text: impl Into<RopeSlice<'a>>) -> usize {
    text.into().len_chars()
}

/// Byte offset of codepoint `column` in `text`.
///
/// `column == char_len(text)` maps to the byte length (the end-of-line position). Anything past
/// that returns `None`; the caller decides which error to raise.
pub fn byte_offset<'a>(text: impl Into<RopeSlice<'a>>, column: usize) -> Option<usize> {
    let text = text.into();
    (column <= text.len_chars()).then(|| text.char_to_byte(column))
}

/// Codepoint column of byte offset `byte`. `None` when `byte` is past the end or not on a
/// character boundary.
pub fn column_of<'a>(text: impl Into<RopeSlice<'a>>, byte: usize) -> Option<usize> {
    let text = text.into();
    if byte > text.len_bytes() {
        return None;
    }
    let column = text.byte_to_char(byte);
    (text.char_to_byte(column) == byte).then_some(column)
}

/// Codepoint range covering `count` codepoints starting at `column`.
///
/// The count is clamped to the codepoints remaining on the line. The start column itself is not
/// clamped: `None` if it lies beyond the line.
pub fn char_range<'a>(
    text: impl Into<RopeSlice<'a>>,
    column: usize,
    count: usize,
) -> Option<Range<usize>> {
    let len = text.into().len_chars();
    (column <= len).then(|| column..column.saturating_add(count).min(len))
}

/// Terminal cell width of `text`. Control characters count as zero cells.
pub fn display_width<'a>(text: impl Into<RopeSlice<'a>>) -> usize {
    text.into().chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Column of the first occurrence of `ch` in `text`.
pub fn find_char<'a>(text: impl Into<RopeSlice<'a>>, ch: char) -> Option<usize> {
    text.into().chars().position(|c| c == ch)
}
