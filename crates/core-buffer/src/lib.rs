//! Buffer facade: one document with its history, clipboard handle, highlighting cache and file
//! association, plus the [`EditorContext`] that owns a set of buffers behind [`BufferId`]s.
//!
//! Data flow for every mutator: validate the position against the [`core_text::Document`], apply
//! the primitive, record the forward [`core_state::EditRecord`], then drop cached tokens from the
//! first touched row on. Validation happens before anything changes, so an `Err` always means
//! the buffer is exactly as it was before the call.

use std::path::PathBuf;
use thiserror::Error;

mod buffer;
mod context;
mod persist;

pub use buffer::{Buffer, BufferOptions};
pub use context::{BufferId, EditorContext};
pub use core_config::LineEndingPolicy;
pub use core_state::{Clipboard, LineEnding};
pub use core_syntax::{LineState, Token, TokenKind};
pub use core_text::{ErrorKind, Position, TextError};

#[derive(Debug, Error)]
pub enum BufferError {
    #[error(transparent)]
    Text(#[from] TextError),
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8", path.display())]
    InvalidEncoding { path: PathBuf },
    #[error("unknown buffer handle {0:?}")]
    UnknownHandle(BufferId),
    #[error("unknown language {0:?}")]
    UnknownLanguage(String),
    #[error("buffer has no file path")]
    NoPath,
}

impl BufferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BufferError::Text(e) => e.kind(),
            BufferError::Io { .. } => ErrorKind::Io,
            BufferError::InvalidEncoding { .. }
            | BufferError::UnknownHandle(_)
            | BufferError::UnknownLanguage(_)
            | BufferError::NoPath => ErrorKind::InvalidArgument,
        }
    }
}

pub type Result<T, E = BufferError> = std::result::Result<T, E>;
