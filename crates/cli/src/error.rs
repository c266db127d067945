//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Session file not found
    #[error("Session file not found: {path}")]
    ConfigNotFound { path: String },

    /// A producer thread panicked
    #[error("Producer '{name}' panicked")]
    ProducerPanicked { name: String },

    /// Scribe could not be opened
    #[error("Scribe error: {0}")]
    Scribe(#[from] scribe::ScribeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn producer_panicked(name: impl Into<String>) -> Self {
        Self::ProducerPanicked { name: name.into() }
    }
}
