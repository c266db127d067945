//! ScribeConfig - construction-time settings for a scribe

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Scribe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ScribeConfig {
    /// Scribe name (used for logging/metrics)
    #[serde(default = "default_scribe_name")]
    #[validate(length(min = 1, message = "scribe name cannot be empty"))]
    pub name: String,

    /// Upper bound on waiting for the critical section, in milliseconds
    ///
    /// `None` means `submit` blocks until the section is free.
    #[serde(default)]
    #[validate(range(min = 1, message = "lock_timeout_ms must be >= 1"))]
    pub lock_timeout_ms: Option<u64>,
}

fn default_scribe_name() -> String {
    "scribe".to_string()
}

impl Default for ScribeConfig {
    fn default() -> Self {
        Self {
            name: default_scribe_name(),
            lock_timeout_ms: None,
        }
    }
}

impl ScribeConfig {
    /// Create a config with the given name and no lock timeout
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Lock timeout as a `Duration`
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }
}
