//! EditSink trait - scribe output interface
//!
//! A sink applies edits to a buffer owned by someone else. Sinks are not
//! expected to synchronize themselves: the scribe guarantees that at most one
//! of these methods runs at any instant.

use crate::Edit;

/// Edit application trait
///
/// All sink implementations must implement this trait.
pub trait EditSink: Send {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Apply an `Add` edit
    ///
    /// Returns `false` to reject the edit (e.g. coordinates out of range).
    fn apply_add(&mut self, edit: Edit) -> bool;

    /// Apply a `Delete` edit
    ///
    /// Same contract as [`EditSink::apply_add`].
    fn apply_delete(&mut self, edit: Edit) -> bool;

    /// Called once when the owning scribe shuts down
    fn close(&mut self) {}
}

impl<S: EditSink + ?Sized> EditSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn apply_add(&mut self, edit: Edit) -> bool {
        (**self).apply_add(edit)
    }

    fn apply_delete(&mut self, edit: Edit) -> bool {
        (**self).apply_delete(edit)
    }

    fn close(&mut self) {
        (**self).close()
    }
}
