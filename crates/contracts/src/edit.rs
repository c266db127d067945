//! Edit - the unit of work submitted to a scribe
//!
//! An `Edit` is a plain value: the scribe forwards it to its sink untouched.
//! `id` and `timestamp` belong to the caller and are never interpreted here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of mutation carried by an [`Edit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditEvent {
    /// Write `character` at (`row`, `col`)
    Add,
    /// Clear the cell at (`row`, `col`)
    Delete,
}

impl EditEvent {
    /// Stable lowercase label for logs/metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            EditEvent::Add => "add",
            EditEvent::Delete => "delete",
        }
    }
}

impl fmt::Display for EditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single edit request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edit {
    /// Caller-assigned correlation id
    pub id: usize,

    /// Which sink capability handles this edit
    pub event: EditEvent,

    /// Row coordinate
    pub row: usize,

    /// Column coordinate
    pub col: usize,

    /// Payload (only meaningful for `Add`)
    #[serde(default)]
    pub character: u32,

    /// Caller-assigned ordering hint
    #[serde(default)]
    pub timestamp: i64,
}

impl Edit {
    /// Create an `Add` edit
    pub fn add(id: usize, row: usize, col: usize, character: u32, timestamp: i64) -> Self {
        Self {
            id,
            event: EditEvent::Add,
            row,
            col,
            character,
            timestamp,
        }
    }

    /// Create a `Delete` edit
    pub fn delete(id: usize, row: usize, col: usize, timestamp: i64) -> Self {
        Self {
            id,
            event: EditEvent::Delete,
            row,
            col,
            character: 0,
            timestamp,
        }
    }

    /// Payload as a `char`, if it is a valid scalar value
    pub fn as_char(&self) -> Option<char> {
        char::from_u32(self.character)
    }
}
