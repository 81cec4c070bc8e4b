use crate::{Buffer, BufferError, BufferOptions, Clipboard, Result};
use core_config::Config;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Stable identifier for a buffer owned by an [`EditorContext`].
///
/// Ids are never reused within one context, so a stale id is always reported as
/// [`BufferError::UnknownHandle`] rather than silently naming a different buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(pub u64);

/// Application-level owner of open buffers and the clipboard they share.
///
/// Nothing here is process-global: independent contexts (one per test, say) never see each
/// other's buffers or clipboard.
#[derive(Debug)]
pub struct EditorContext {
    buffers: BTreeMap<BufferId, Buffer>,
    next_id: u64,
    options: BufferOptions,
    config: Config,
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

impl EditorContext {
    pub fn new(config: Config) -> Self {
        let options = BufferOptions::from_config(&config, Clipboard::new());
        Self {
            buffers: BTreeMap::new(),
            next_id: 1,
            options,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.options.clipboard
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// New empty buffer sharing this context's clipboard.
    pub fn create_buffer(&mut self) -> BufferId {
        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.buffers
            .insert(id, Buffer::with_options(self.options.clone()));
        debug!(target: "buffer", id = id.0, open = self.buffers.len(), "buffer_created");
        id
    }

    /// Id of the open buffer whose file is `path`, compared as absolute paths.
    pub fn find_by_path(&self, path: &Path) -> Option<BufferId> {
        let wanted = absolute(path);
        self.buffers
            .iter()
            .find(|(_, b)| b.path().is_some_and(|p| absolute(p) == wanted))
            .map(|(id, _)| *id)
    }

    /// Open `path` in a new buffer, or return the buffer already showing it. A missing file
    /// opens as an empty buffer bound to that path.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<BufferId> {
        let path = path.as_ref();
        if let Some(id) = self.find_by_path(path) {
            debug!(target: "buffer", id = id.0, "buffer_already_open");
            return Ok(id);
        }
        let mut buffer = Buffer::with_options(self.options.clone());
        buffer.load_file(path)?;
        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.buffers.insert(id, buffer);
        info!(target: "buffer", id = id.0, file = %path.display(), open = self.buffers.len(), "buffer_opened");
        Ok(id)
    }

    /// Drop the buffer. Its id is invalid afterwards.
    pub fn destroy_buffer(&mut self, id: BufferId) -> Result<()> {
        self.buffers
            .remove(&id)
            .ok_or(BufferError::UnknownHandle(id))?;
        debug!(target: "buffer", id = id.0, open = self.buffers.len(), "buffer_destroyed");
        Ok(())
    }

    pub fn buffer(&self, id: BufferId) -> Result<&Buffer> {
        self.buffers.get(&id).ok_or(BufferError::UnknownHandle(id))
    }

    pub fn buffer_mut(&mut self, id: BufferId) -> Result<&mut Buffer> {
        self.buffers
            .get_mut(&id)
            .ok_or(BufferError::UnknownHandle(id))
    }
}
