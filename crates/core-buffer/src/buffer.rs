use crate::persist::{self, ReadOutcome};
use crate::{BufferError, Clipboard, LineEnding, Result};
use core_config::{Config, LineEndingPolicy};
use core_state::{Change, EditRecord, History};
use core_syntax::{HighlightCache, Language, LanguageRegistry, Token};
use core_text::{Document, Position, search, unicode};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Construction parameters for a [`Buffer`].
#[derive(Debug, Clone)]
pub struct BufferOptions {
    pub max_history: usize,
    pub coalesce: bool,
    pub line_ending: LineEndingPolicy,
    pub clipboard: Clipboard,
    pub languages: Arc<LanguageRegistry>,
    pub default_language: String,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self::from_config(&Config::default(), Clipboard::new())
    }
}

impl BufferOptions {
    /// Options drawn from `config`, sharing `clipboard`.
    pub fn from_config(config: &Config, clipboard: Clipboard) -> Self {
        let mut languages = LanguageRegistry::default();
        for spec in &config.file.syntax.languages {
            languages.register(spec.clone());
        }
        Self {
            max_history: config.file.history.max_depth,
            coalesce: config.file.history.coalesce,
            line_ending: config.file.io.line_ending,
            clipboard,
            languages: Arc::new(languages),
            default_language: config.file.syntax.default_language.clone(),
        }
    }
}

/// One open document.
#[derive(Debug)]
pub struct Buffer {
    doc: Document,
    history: History,
    clipboard: Clipboard,
    highlight: HighlightCache,
    languages: Arc<LanguageRegistry>,
    default_language: String,
    language: Language,
    path: Option<PathBuf>,
    line_ending: LineEnding,
    save_policy: LineEndingPolicy,
    saved_state: u64,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    /// Empty single-line buffer with default options and a private clipboard.
    pub fn new() -> Self {
        Self::with_options(BufferOptions::default())
    }

    pub fn with_options(options: BufferOptions) -> Self {
        let language = options
            .languages
            .by_name(&options.default_language)
            .cloned()
            .unwrap_or_else(Language::plain);
        let history = History::new(options.max_history, options.coalesce);
        let saved_state = history.state_id();
        Self {
            doc: Document::new(),
            history,
            clipboard: options.clipboard,
            highlight: HighlightCache::new(),
            languages: options.languages,
            default_language: options.default_language,
            language,
            path: None,
            line_ending: LineEnding::default(),
            save_policy: options.line_ending,
            saved_state,
        }
    }

    // ---- queries -------------------------------------------------------------------------

    pub fn line_count(&self) -> usize {
        self.doc.line_count()
    }

    pub fn line(&self, row: usize) -> Result<Cow<'_, str>> {
        Ok(self.doc.line(row)?)
    }

    pub fn unicode_len(&self, row: usize) -> Result<usize> {
        Ok(self.doc.unicode_len(row)?)
    }

    pub fn lines(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.doc.lines()
    }

    /// Whole document with `\n` between lines.
    pub fn text(&self) -> String {
        self.doc.join("\n")
    }

    /// Terminal cell offset of `column` on `row`.
    pub fn display_column(&self, row: usize, column: usize) -> Result<usize> {
        self.doc.check(Position::new(row, column))?;
        let line = self.doc.line_ref(row)?;
        Ok(unicode::display_width(line.slice().slice(..column)))
    }

    /// Column of the first `ch` on `row`.
    pub fn find_char_in_line(&self, row: usize, ch: char) -> Result<Option<usize>> {
        Ok(unicode::find_char(self.doc.line_ref(row)?.slice(), ch))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn is_modified(&self) -> bool {
        self.history.state_id() != self.saved_state
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    // ---- mutators ------------------------------------------------------------------------

    fn commit(&mut self, record: EditRecord) {
        self.highlight.invalidate_from(record.first_row());
        self.history.record(record);
    }

    /// Insert `text` at `pos` on a single line; `\n` in `text` is kept as a literal character.
    pub fn insert_text(&mut self, pos: Position, text: &str) -> Result<()> {
        self.doc.check(pos)?;
        if text.is_empty() {
            return Ok(());
        }
        self.doc.insert_text(pos, text)?;
        self.commit(EditRecord::Insert {
            at: pos,
            text: text.to_string(),
        });
        Ok(())
    }

    /// Delete up to `count` codepoints at `pos` (never crossing the line end). Returns the
    /// removed text.
    pub fn delete_text(&mut self, pos: Position, count: usize) -> Result<String> {
        let removed = self.doc.delete_text(pos, count)?;
        if !removed.is_empty() {
            self.commit(EditRecord::Delete {
                at: pos,
                text: removed.clone(),
            });
        }
        Ok(removed)
    }

    pub fn split_line(&mut self, pos: Position) -> Result<()> {
        self.doc.split_line(pos)?;
        self.commit(EditRecord::Split { at: pos });
        Ok(())
    }

    /// Join `row` onto `row - 1`. Returns the column where the lines met.
    pub fn join_lines(&mut self, row: usize) -> Result<usize> {
        let prev_len = self.doc.join_lines(row)?;
        self.commit(EditRecord::Join { row, prev_len });
        Ok(prev_len)
    }

    /// End the current typing run so the next insert starts a new undo step.
    pub fn break_coalescing(&mut self) {
        self.history.break_coalescing();
    }

    // ---- clipboard -----------------------------------------------------------------------

    /// Copy up to `count` codepoints at `pos` into the clipboard. Not undoable.
    pub fn copy_text(&mut self, pos: Position, count: usize) -> Result<()> {
        let text = self.doc.slice(pos, count)?;
        self.clipboard.set(text);
        Ok(())
    }

    /// Copy the span between two positions; lines are joined with `\n`.
    pub fn copy_range(&mut self, start: Position, end: Position) -> Result<()> {
        let text = self.doc.text_between(start, end)?;
        self.clipboard.set(text);
        Ok(())
    }

    /// Insert the clipboard at `pos` as one undoable step. Returns the position just past the
    /// pasted text, or `None` when the clipboard is empty.
    pub fn paste_text(&mut self, pos: Position) -> Result<Option<Position>> {
        self.doc.check(pos)?;
        let Some(text) = self.clipboard.get().filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        self.history.break_coalescing();
        if !text.contains('\n') {
            self.doc.insert_text(pos, &text)?;
            let end = Document::advance(pos, &text);
            self.commit(EditRecord::Insert { at: pos, text });
            self.history.break_coalescing();
            return Ok(Some(end));
        }

        let mut records = Vec::new();
        let mut at = pos;
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                records.push(EditRecord::Split { at });
                at = Position::new(at.row + 1, 0);
            }
            if !segment.is_empty() {
                records.push(EditRecord::Insert {
                    at,
                    text: segment.to_string(),
                });
                at = Document::advance(at, segment);
            }
        }
        let group = EditRecord::Group(records);
        group.apply(&mut self.doc)?;
        self.commit(group);
        debug!(target: "buffer", row = pos.row, column = pos.column, size_bytes = text.len(), "paste_multiline");
        Ok(Some(at))
    }

    // ---- history -------------------------------------------------------------------------

    fn after_history(&mut self, change: Option<Change>) -> Option<Position> {
        let change = change?;
        self.highlight.invalidate_from(change.first_row);
        Some(change.cursor)
    }

    /// Revert the last edit. Returns where it happened, `None` when there was nothing to undo.
    pub fn undo(&mut self) -> Result<Option<Position>> {
        let change = self.history.undo(&mut self.doc)?;
        Ok(self.after_history(change))
    }

    pub fn redo(&mut self) -> Result<Option<Position>> {
        let change = self.history.redo(&mut self.doc)?;
        Ok(self.after_history(change))
    }

    // ---- search --------------------------------------------------------------------------

    /// First match at or after `start`, wrapping; see [`search::find_next`].
    pub fn find_next(&self, term: &str, start: Position) -> Result<Option<Position>> {
        Ok(search::find_next(&self.doc, term, start)?)
    }

    /// Next match strictly after the cursor; see [`search::find_after`].
    pub fn find_after(&self, term: &str, cursor: Position) -> Result<Option<Position>> {
        Ok(search::find_after(&self.doc, term, cursor)?)
    }

    pub fn find_all(&self, term: &str) -> Result<Vec<Position>> {
        Ok(search::find_all(&self.doc, term)?)
    }

    /// Replace every non-overlapping `old` with `new`, line by line, as one undo step.
    /// Returns the number of replacements.
    pub fn replace_all(&mut self, old: &str, new: &str) -> Result<usize> {
        if old.is_empty() {
            return Err(core_text::TextError::InvalidArgument("replace term must not be empty").into());
        }
        let mut records = Vec::new();
        for (row, line) in self.doc.lines().enumerate() {
            // Right to left so earlier columns stay valid while applying.
            for byte in search::line_matches(&line, old).into_iter().rev() {
                let at = Position::new(row, unicode::column_of(&*line, byte).unwrap_or(0));
                records.push(EditRecord::Delete {
                    at,
                    text: old.to_string(),
                });
                if !new.is_empty() {
                    records.push(EditRecord::Insert {
                        at,
                        text: new.to_string(),
                    });
                }
            }
        }
        let count = records
            .iter()
            .filter(|r| matches!(r, EditRecord::Delete { .. }))
            .count();
        if count == 0 {
            return Ok(0);
        }
        let group = EditRecord::Group(records);
        group.apply(&mut self.doc)?;
        self.history.break_coalescing();
        self.commit(group);
        info!(target: "buffer", count, old_bytes = old.len(), new_bytes = new.len(), "replace_all");
        Ok(count)
    }

    // ---- highlighting --------------------------------------------------------------------

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn set_language(&mut self, name: &str) -> Result<()> {
        let Some(language) = self.languages.by_name(name).cloned() else {
            let known: Vec<&str> = self.languages.names().collect();
            warn!(target: "buffer", requested = name, ?known, "unknown_language");
            return Err(BufferError::UnknownLanguage(name.to_string()));
        };
        self.language = language;
        self.highlight.clear();
        Ok(())
    }

    /// Tokens for `row`; rows above it are lexed first if their state is not cached.
    pub fn highlight(&mut self, row: usize) -> Result<&[Token]> {
        Ok(self.highlight.tokens(&self.language, &self.doc, row)?)
    }

    // ---- persistence ---------------------------------------------------------------------

    fn pick_language(&mut self, path: &Path) {
        self.language = self
            .languages
            .for_path(path)
            .or_else(|| self.languages.by_name(&self.default_language))
            .cloned()
            .unwrap_or_else(Language::plain);
    }

    /// Replace the document with the file at `path`. A missing file leaves an empty document
    /// and is not an error. History is cleared either way and the buffer takes `path` as its
    /// file. On error the buffer is left untouched.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let (document, line_ending) = match persist::read_document(path)? {
            ReadOutcome::Loaded {
                document,
                line_ending,
            } => (document, line_ending),
            ReadOutcome::Missing => (Document::new(), LineEnding::default()),
        };
        self.doc = document;
        self.line_ending = line_ending;
        self.history.clear();
        self.saved_state = self.history.state_id();
        self.highlight.clear();
        self.pick_language(path);
        self.path = Some(path.to_path_buf());
        info!(target: "buffer", file = %path.display(), lines = self.doc.line_count(), language = self.language.name(), "buffer_loaded");
        Ok(())
    }

    /// Write all lines joined by the line terminator to `path`. The buffer keeps its own path;
    /// it is marked unmodified only if `path` is that path.
    pub fn save_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let ending = persist::effective_ending(self.save_policy, self.line_ending);
        persist::write_document(path, &self.doc, ending)?;
        if self.path.as_deref() == Some(path) {
            self.saved_state = self.history.state_id();
        }
        Ok(())
    }

    /// Write to the buffer's own path.
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(BufferError::NoPath)?;
        self.save_file(path)
    }

    /// Write to `path` and make it the buffer's path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let ending = persist::effective_ending(self.save_policy, self.line_ending);
        persist::write_document(path, &self.doc, ending)?;
        self.path = Some(path.to_path_buf());
        self.saved_state = self.history.state_id();
        self.pick_language(path);
        self.highlight.clear();
        Ok(())
    }
}
