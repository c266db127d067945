//! # Config Loader
//!
//! Turns a TOML or JSON session file into a validated `SessionBlueprint`.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let session = ConfigLoader::load_from_path(Path::new("session.toml")).unwrap();
//! println!("Scribe: {}", session.scribe.name);
//! ```

mod format;
mod validator;

pub use contracts::SessionBlueprint;
pub use format::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Loads, validates and re-serializes session files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a session file; the format follows the extension
    pub fn load_from_path(path: &Path) -> Result<SessionBlueprint, ContractError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Parse and validate session text
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<SessionBlueprint, ContractError> {
        let blueprint = format.parse(content)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Re-check a blueprint after it was modified in memory (CLI overrides)
    pub fn validate(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    pub fn to_toml(blueprint: &SessionBlueprint) -> Result<String, ContractError> {
        ConfigFormat::Toml.render(blueprint)
    }

    pub fn to_json(blueprint: &SessionBlueprint) -> Result<String, ContractError> {
        ConfigFormat::Json.render(blueprint)
    }
}
