//! File read/write helpers.
//!
//! Synchronous and minimal. Reading distinguishes "no such file" (a new file, not an error) from
//! real failures; writing emits exactly the joined lines with no extra trailing terminator.

use crate::{BufferError, LineEnding, Result};
use core_config::LineEndingPolicy;
use core_text::Document;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use tracing::{debug, error};

/// Result of reading a file from disk.
#[derive(Debug)]
pub(crate) enum ReadOutcome {
    Loaded {
        document: Document,
        line_ending: LineEnding,
    },
    Missing,
}

pub(crate) fn read_document(path: &Path) -> Result<ReadOutcome> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            debug!(target: "io", file = %path.display(), "file_missing_new_buffer");
            return Ok(ReadOutcome::Missing);
        }
        Err(source) => {
            error!(target: "io", file = %path.display(), ?source, "file_read_error");
            return Err(BufferError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let size_bytes = bytes.len();
    let content = String::from_utf8(bytes).map_err(|_| {
        error!(target: "io", file = %path.display(), size_bytes, "file_not_utf8");
        BufferError::InvalidEncoding {
            path: path.to_path_buf(),
        }
    })?;
    let line_ending = LineEnding::detect(&content);
    let document = Document::from_text(&content, line_ending.as_str());
    debug!(
        target: "io",
        file = %path.display(),
        size_bytes,
        line_count = document.line_count(),
        ?line_ending,
        "file_read_ok"
    );
    Ok(ReadOutcome::Loaded {
        document,
        line_ending,
    })
}

pub(crate) fn effective_ending(policy: LineEndingPolicy, detected: LineEnding) -> LineEnding {
    match policy {
        LineEndingPolicy::Detect => detected,
        LineEndingPolicy::Lf => LineEnding::Lf,
        LineEndingPolicy::Crlf => LineEnding::Crlf,
    }
}

pub(crate) fn write_document(path: &Path, document: &Document, ending: LineEnding) -> Result<()> {
    let content = document.join(ending.as_str());
    match std::fs::write(path, content.as_bytes()) {
        Ok(()) => {
            debug!(target: "io", file = %path.display(), size_bytes = content.len(), line_count = document.line_count(), "file_write_ok");
            Ok(())
        }
        Err(source) => {
            error!(target: "io", file = %path.display(), ?source, "file_write_error");
            Err(BufferError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}
