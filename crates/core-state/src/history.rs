use core_text::{Document, Position, TextError, unicode};
use tracing::{error, trace};

/// Default bound on retained undo entries.
pub const HISTORY_MAX_DEFAULT: usize = 1000;

/// One reversible mutation of a [`Document`].
///
/// Records are stored in their forward form; undo applies [`EditRecord::inverse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRecord {
    Insert { at: Position, text: String },
    Delete { at: Position, text: String },
    /// `at` is where the line was split; the suffix moved to `at.row + 1`.
    Split { at: Position },
    /// Line `row` was appended to `row - 1`, which was `prev_len` codepoints long before.
    Join { row: usize, prev_len: usize },
    /// Applied in order as one undo step.
    Group(Vec<EditRecord>),
}

impl EditRecord {
    pub fn inverse(&self) -> EditRecord {
        match self {
            EditRecord::Insert { at, text } => EditRecord::Delete {
                at: *at,
                text: text.clone(),
            },
            EditRecord::Delete { at, text } => EditRecord::Insert {
                at: *at,
                text: text.clone(),
            },
            EditRecord::Split { at } => EditRecord::Join {
                row: at.row + 1,
                prev_len: at.column,
            },
            EditRecord::Join { row, prev_len } => EditRecord::Split {
                at: Position::new(row - 1, *prev_len),
            },
            EditRecord::Group(records) => {
                EditRecord::Group(records.iter().rev().map(EditRecord::inverse).collect())
            }
        }
    }

    /// Apply to `doc` without touching any history.
    pub fn apply(&self, doc: &mut Document) -> Result<(), TextError> {
        match self {
            EditRecord::Insert { at, text } => doc.insert_text(*at, text),
            EditRecord::Delete { at, text } => {
                let removed = doc.delete_text(*at, unicode::char_len(text.as_str()))?;
                debug_assert_eq!(&removed, text, "history out of sync with document");
                Ok(())
            }
            EditRecord::Split { at } => doc.split_line(*at),
            EditRecord::Join { row, .. } => doc.join_lines(*row).map(|_| ()),
            EditRecord::Group(records) => {
                for record in records {
                    record.apply(doc)?;
                }
                Ok(())
            }
        }
    }

    /// Cursor position right after this record has been applied.
    pub fn cursor_after(&self) -> Position {
        match self {
            EditRecord::Insert { at, text } => Document::advance(*at, text),
            EditRecord::Delete { at, .. } => *at,
            EditRecord::Split { at } => Position::new(at.row + 1, 0),
            EditRecord::Join { row, prev_len } => Position::new(row.saturating_sub(1), *prev_len),
            EditRecord::Group(records) => records
                .last()
                .map(EditRecord::cursor_after)
                .unwrap_or_default(),
        }
    }

    /// Lowest row whose content may differ once this record is applied.
    pub fn first_row(&self) -> usize {
        match self {
            EditRecord::Insert { at, .. } | EditRecord::Delete { at, .. } => at.row,
            EditRecord::Split { at } => at.row,
            EditRecord::Join { row, .. } => row.saturating_sub(1),
            EditRecord::Group(records) => records
                .iter()
                .map(EditRecord::first_row)
                .min()
                .unwrap_or(0),
        }
    }

    fn single_char_insert(&self) -> bool {
        matches!(self, EditRecord::Insert { text, .. } if text.chars().count() == 1)
    }
}

/// Where an undo or redo landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub cursor: Position,
    pub first_row: usize,
}

#[derive(Debug, Clone)]
struct Entry {
    id: u64,
    record: EditRecord,
}

/// Undo/redo stacks of [`EditRecord`]s.
///
/// Consecutive single-character inserts that continue exactly where the previous one ended are
/// merged into one entry while a run is open. Any other record, an undo/redo, or
/// [`History::break_coalescing`] closes the run.
///
/// Each entry carries an id naming the document state it produces; [`History::state_id`] lets the
/// owner compare against the id it saw at its last save.
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<Entry>,
    redo_stack: Vec<Entry>,
    max_depth: usize,
    coalesce: bool,
    run_open: bool,
    next_id: u64,
    /// State id of the document with the undo stack empty. Moves up when the oldest entry is
    /// dropped, since that entry's edit stays in the document.
    floor: u64,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_MAX_DEFAULT, true)
    }
}

impl History {
    /// `max_depth == 0` keeps every entry.
    pub fn new(max_depth: usize, coalesce: bool) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
            coalesce,
            run_open: false,
            next_id: 1,
            floor: 0,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Identifier of the current document state. Equal ids mean equal content; ids are never
    /// reused, including across trimming and [`History::clear`].
    pub fn state_id(&self) -> u64 {
        self.undo_stack.last().map_or(self.floor, |e| e.id)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.run_open = false;
        self.floor = self.fresh_id();
        trace!(target: "state.history", "history_cleared");
    }

    pub fn break_coalescing(&mut self) {
        self.run_open = false;
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Record a forward edit that has already been applied to the document.
    pub fn record(&mut self, record: EditRecord) {
        self.redo_stack.clear();
        if self.try_coalesce(&record) {
            return;
        }
        self.run_open = self.coalesce && record.single_char_insert();
        let id = self.fresh_id();
        self.undo_stack.push(Entry { id, record });
        trace!(target: "state.history", undo_depth = self.undo_stack.len(), id, "record_push");
        if self.max_depth > 0 && self.undo_stack.len() > self.max_depth {
            let dropped = self.undo_stack.remove(0);
            self.floor = dropped.id;
            trace!(target: "state.history", max_depth = self.max_depth, floor = self.floor, "undo_stack_trimmed");
        }
    }

    fn try_coalesce(&mut self, record: &EditRecord) -> bool {
        if !self.run_open || !record.single_char_insert() {
            return false;
        }
        let EditRecord::Insert { at, text } = record else {
            return false;
        };
        let Some(top) = self.undo_stack.last_mut() else {
            return false;
        };
        let EditRecord::Insert {
            at: run_at,
            text: run_text,
        } = &mut top.record
        else {
            return false;
        };
        if Document::advance(*run_at, run_text) != *at {
            return false;
        }
        run_text.push_str(text);
        let run_chars = run_text.chars().count();
        top.id = self.next_id;
        self.next_id += 1;
        trace!(target: "state.history", undo_depth = self.undo_stack.len(), run_chars, "record_coalesced");
        true
    }

    /// Revert the most recent entry. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> Result<Option<Change>, TextError> {
        self.run_open = false;
        let Some(entry) = self.undo_stack.pop() else {
            return Ok(None);
        };
        let inverse = entry.record.inverse();
        if let Err(e) = inverse.apply(doc) {
            error!(target: "state.history", ?e, "undo_apply_failed");
            self.undo_stack.push(entry);
            return Err(e);
        }
        let change = Change {
            cursor: inverse.cursor_after(),
            first_row: inverse.first_row(),
        };
        self.redo_stack.push(entry);
        trace!(target: "state.history", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
        Ok(Some(change))
    }

    /// Re-apply the most recently undone entry. `Ok(None)` when there is nothing to redo.
    pub fn redo(&mut self, doc: &mut Document) -> Result<Option<Change>, TextError> {
        self.run_open = false;
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(None);
        };
        if let Err(e) = entry.record.apply(doc) {
            error!(target: "state.history", ?e, "redo_apply_failed");
            self.redo_stack.push(entry);
            return Err(e);
        }
        let change = Change {
            cursor: entry.record.cursor_after(),
            first_row: entry.record.first_row(),
        };
        self.undo_stack.push(entry);
        trace!(target: "state.history", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "redo_pop");
        Ok(Some(change))
    }
}
