use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

/// Copy/paste register holding the last copied span.
///
/// Cloning yields another handle onto the same register, which is how an `EditorContext` shares
/// one register between all of its buffers. Writes are last-write-wins. The register is not part
/// of undo history.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    slot: Arc<Mutex<Option<String>>>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        // A panic while holding the lock cannot leave a half-written String behind.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set(&self, text: impl Into<String>) {
        let text = text.into();
        trace!(target: "state.clipboard", size_bytes = text.len(), "clipboard_set");
        *self.lock() = Some(text);
    }

    /// Current payload (clone-on-read).
    pub fn get(&self) -> Option<String> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn is_empty(&self) -> bool {
        self.lock().as_deref().is_none_or(str::is_empty)
    }

    /// True when both handles point at the same register.
    pub fn shares_with(&self, other: &Clipboard) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let c = Clipboard::new();
        assert!(c.is_empty());
        assert_eq!(c.get(), None);
    }

    #[test]
    fn last_write_wins_across_clones() {
        let a = Clipboard::new();
        let b = a.clone();
        a.set("first");
        b.set("second");
        assert_eq!(a.get().as_deref(), Some("second"));
        assert!(a.shares_with(&b));
        assert!(!a.shares_with(&Clipboard::new()));
    }

    #[test]
    fn shared_across_threads() {
        let c = Clipboard::new();
        let handle = {
            let c = c.clone();
            std::thread::spawn(move || c.set("from thread"))
        };
        handle.join().unwrap();
        assert_eq!(c.get().as_deref(), Some("from thread"));
        c.clear();
        assert!(c.is_empty());
    }
}
