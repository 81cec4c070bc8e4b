//! Lexical line tokenizer for highlighting.
//!
//! Classifies keywords, quoted strings (escape aware) and comments. Spans are codepoint columns,
//! sorted and non-overlapping. Text matching no rule produces no token at all; renderers fill
//! gaps with the default style, so a line without constructs yields an empty token list.
//!
//! Block comments are the only construct that outlives a line. [`tokenize_line`] takes the
//! state the previous line ended in and returns the state this line ends in; [`HighlightCache`]
//! threads that state through rows in order.

use core_text::{Document, TextError};
use tracing::trace;

pub mod language;

pub use language::{Language, LanguageRegistry, LanguageSpec};

/// Token classification. Ordinals are part of the presentation contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    String,
    Comment,
    Default,
}

impl TokenKind {
    pub fn ordinal(self) -> u8 {
        match self {
            TokenKind::Keyword => 0,
            TokenKind::String => 1,
            TokenKind::Comment => 2,
            TokenKind::Default => 3,
        }
    }
}

/// Half-open codepoint span `[start, end)` on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(start: usize, end: usize, kind: TokenKind) -> Self {
        Self { start, end, kind }
    }
}

/// Lexer state at a line boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineState {
    #[default]
    Normal,
    InBlockComment,
}

/// Byte cursor over a line that keeps the matching codepoint column.
struct Cursor<'a> {
    text: &'a str,
    byte: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            column: 0,
        }
    }
    fn rest(&self) -> &'a str {
        &self.text[self.byte..]
    }
    fn at_end(&self) -> bool {
        self.byte >= self.text.len()
    }
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.byte += c.len_utf8();
        self.column += 1;
        Some(c)
    }
    /// Advance by `len` bytes (must land on a char boundary).
    fn skip_bytes(&mut self, len: usize) {
        let end = self.byte + len;
        self.column += self.text[self.byte..end].chars().count();
        self.byte = end;
    }
    fn skip_to_end(&mut self) {
        self.skip_bytes(self.text.len() - self.byte);
    }
}

fn is_word_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Consume through the block comment terminator, or to the end of the line when it is absent.
/// Returns true when the comment was closed on this line.
fn consume_block_body(cur: &mut Cursor<'_>, close: &str) -> bool {
    match cur.rest().find(close) {
        Some(at) => {
            cur.skip_bytes(at + close.len());
            true
        }
        None => {
            cur.skip_to_end();
            false
        }
    }
}

/// Tokenize one line that starts in `entry` state. Returns the tokens and the exit state.
pub fn tokenize_line(lang: &Language, text: &str, entry: LineState) -> (Vec<Token>, LineState) {
    let mut tokens = Vec::new();
    let mut cur = Cursor::new(text);
    let mut state = LineState::Normal;

    // A language without block comments cannot be inside one, whatever the entry says.
    if entry == LineState::InBlockComment
        && let Some((_, close)) = &lang.block_comment
    {
        let closed = consume_block_body(&mut cur, close);
        if cur.column > 0 {
            tokens.push(Token::new(0, cur.column, TokenKind::Comment));
        }
        if !closed {
            return (tokens, LineState::InBlockComment);
        }
    }

    while !cur.at_end() {
        let start = cur.column;
        let rest = cur.rest();

        let line_marker = lang
            .line_comment
            .as_deref()
            .filter(|m| rest.starts_with(*m));
        let block = lang
            .block_comment
            .as_ref()
            .filter(|(open, _)| rest.starts_with(open.as_str()));

        // Longest marker wins: Lua's `--[[` opens a block although `--` starts a line comment.
        if let Some((open, close)) = block
            && line_marker.is_none_or(|m| open.len() >= m.len())
        {
            cur.skip_bytes(open.len());
            if !consume_block_body(&mut cur, close) {
                state = LineState::InBlockComment;
            }
            tokens.push(Token::new(start, cur.column, TokenKind::Comment));
            continue;
        }

        if line_marker.is_some() {
            cur.skip_to_end();
            tokens.push(Token::new(start, cur.column, TokenKind::Comment));
            break;
        }

        let Some(c) = cur.bump() else { break };

        if lang.string_delimiters.contains(&c) {
            // Unterminated strings run to the end of the line.
            while let Some(n) = cur.bump() {
                if Some(n) == lang.escape {
                    cur.bump();
                } else if n == c {
                    break;
                }
            }
            tokens.push(Token::new(start, cur.column, TokenKind::String));
            continue;
        }

        if is_word_char(c) {
            let word_start = cur.byte - c.len_utf8();
            while cur.peek().is_some_and(is_word_char) {
                cur.bump();
            }
            let word = &text[word_start..cur.byte];
            if !c.is_numeric() && lang.is_keyword(word) {
                tokens.push(Token::new(start, cur.column, TokenKind::Keyword));
            }
        }
    }

    (tokens, state)
}

#[derive(Debug, Clone)]
struct CachedLine {
    tokens: Vec<Token>,
    exit: LineState,
}

/// Tokens and exit states for a prefix of a document's rows.
///
/// Entries are only ever valid for rows `0..valid_rows()`; an edit at row `r` drops everything
/// from `r` on, since a change there can alter the block-comment state of every later line.
#[derive(Debug, Clone, Default)]
pub struct HighlightCache {
    lines: Vec<CachedLine>,
}

impl HighlightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid_rows(&self) -> usize {
        self.lines.len()
    }

    pub fn invalidate_from(&mut self, row: usize) {
        if row < self.lines.len() {
            trace!(target: "syntax", row, dropped = self.lines.len() - row, "highlight_cache_invalidated");
            self.lines.truncate(row);
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Tokens for `row`, lexing any uncached rows above it first.
    pub fn tokens(
        &mut self,
        lang: &Language,
        doc: &Document,
        row: usize,
    ) -> Result<&[Token], TextError> {
        doc.line(row)?;
        let computed_from = self.lines.len();
        while self.lines.len() <= row {
            let r = self.lines.len();
            let entry = self.lines.last().map(|l| l.exit).unwrap_or_default();
            let (tokens, exit) = tokenize_line(lang, &doc.line(r)?, entry);
            self.lines.push(CachedLine { tokens, exit });
        }
        if computed_from <= row {
            trace!(target: "syntax", from = computed_from, to = row, "highlight_rows_lexed");
        }
        Ok(&self.lines[row].tokens)
    }
}
