//! Per-buffer editing state that sits beside the text: undo history, the copy/paste register,
//! and line-ending metadata.
//!
//! History model:
//! - Every primitive mutation is recorded in forward form as an [`EditRecord`]; undo applies the
//!   record's inverse and moves it to the redo stack, redo re-applies it and moves it back.
//! - Recording a new edit clears the redo stack.
//! - Typing coalesces: a single-character insert that continues exactly where the previous
//!   single-character insert ended extends that entry instead of pushing a new one. The run ends
//!   on any other kind of edit, on undo/redo, or on an explicit `break_coalescing`.
//! - Compound operations (global replace, multi-line paste) record one [`EditRecord::Group`], so
//!   a single undo reverts all of it.
//!
//! Telemetry: history lifecycle events are emitted under target `state.history`
//! (`record_push`, `record_coalesced`, `undo_pop`, `redo_pop`, `undo_stack_trimmed`), clipboard
//! writes under `state.clipboard`. Payload text is never logged, only its size.

pub mod clipboard;
pub mod history;
pub mod line_ending;

pub use clipboard::Clipboard;
pub use history::{Change, EditRecord, HISTORY_MAX_DEFAULT, History};
pub use line_ending::LineEnding;
