//! One-shot memoisation for derived values.

use std::sync::OnceLock;

/// Thread-safe slot for a value that is computed at most once.
///
/// Chunks derive their tree and address lazily; the slot keeps those
/// derivations for the lifetime of the value without handing out aliases
/// to the underlying buffers.
#[derive(Debug)]
pub(crate) struct Memo<T> {
    slot: OnceLock<T>,
}

impl<T> Memo<T> {
    pub(crate) fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// The memoised value, if it has been computed.
    pub(crate) fn get(&self) -> Option<&T> {
        self.slot.get()
    }

    /// The memoised value, computing it on first use.
    pub(crate) fn get_or_compute<F>(&self, compute: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.slot.get_or_init(compute)
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Memo<T> {
    fn clone(&self) -> Self {
        let memo = Self::new();
        if let Some(value) = self.slot.get() {
            let _ = memo.slot.set(value.clone());
        }
        memo
    }
}
