//! SessionBlueprint - Config Loader output
//!
//! Describes a replay session: the scribe, the grid it writes into, and the
//! producers that submit edits concurrently.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{Edit, ScribeConfig};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete session blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Scribe settings
    #[serde(default)]
    pub scribe: ScribeConfig,

    /// Target grid layout
    #[serde(default)]
    pub grid: GridConfig,

    /// Producer threads, one per entry
    pub producers: Vec<ProducerConfig>,
}

impl SessionBlueprint {
    /// Total number of edits across all producers
    pub fn edit_count(&self) -> usize {
        self.producers.iter().map(|p| p.edits.len()).sum()
    }
}

/// Grid buffer layout
///
/// Cells are addressed as `row * row_width + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct GridConfig {
    /// Cells per row
    #[serde(default = "default_row_width")]
    #[validate(range(min = 1, message = "row_width must be >= 1"))]
    pub row_width: usize,

    /// Total number of cells
    #[serde(default = "default_capacity")]
    #[validate(range(min = 1, message = "capacity must be >= 1"))]
    pub capacity: usize,
}

fn default_row_width() -> usize {
    10
}

fn default_capacity() -> usize {
    41
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_width: default_row_width(),
            capacity: default_capacity(),
        }
    }
}

/// A producer and the edits it submits, in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Producer name (also the thread name)
    pub name: String,

    /// Edits submitted by this producer
    #[serde(default)]
    pub edits: Vec<Edit>,
}
