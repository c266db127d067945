//! Scribe error types

use std::time::Duration;

use contracts::EditEvent;
use thiserror::Error;

/// Scribe-specific errors
#[derive(Debug, Error)]
pub enum ScribeError {
    /// Scribe could not be brought up
    #[error("failed to open scribe '{name}': {message}")]
    Init { name: String, message: String },

    /// Submission arrived after shutdown
    #[error("scribe '{name}' is closed, edit {edit_id} rejected")]
    Closed { name: String, edit_id: usize },

    /// Sink rejected the edit
    #[error("sink '{sink}' rejected {event} edit {edit_id}")]
    ApplyFailed {
        sink: String,
        edit_id: usize,
        event: EditEvent,
    },

    /// Critical section not entered in time
    #[error("scribe '{name}' lock not acquired within {waited:?}")]
    LockTimeout { name: String, waited: Duration },
}

impl ScribeError {
    /// Create an init error
    pub fn init(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Init {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Short stable label for logs/metrics
    pub fn as_label(&self) -> &'static str {
        match self {
            ScribeError::Init { .. } => "init",
            ScribeError::Closed { .. } => "closed",
            ScribeError::ApplyFailed { .. } => "apply_failed",
            ScribeError::LockTimeout { .. } => "lock_timeout",
        }
    }

    /// Whether the caller can keep using the scribe (or drop just this edit)
    ///
    /// Only `Init` is fatal.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ScribeError::Init { .. })
    }
}
