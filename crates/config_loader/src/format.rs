//! Session file formats
//!
//! TOML is the primary format; JSON is accepted for generated sessions.
//! Parse failures inside `[[producers]]` name the offending producer.

use std::fmt::Display;
use std::path::Path;

use contracts::{ContractError, ProducerConfig, SessionBlueprint};

/// Session file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Infer format from a path
    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        Self::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn label(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }

    /// Deserialize a session, without validation
    pub fn parse(self, content: &str) -> Result<SessionBlueprint, ContractError> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|e| self.parse_error(content, e)),
            Self::Json => serde_json::from_str(content).map_err(|e| self.parse_error(content, e)),
        }
    }

    /// Serialize a session back to text
    pub fn render(self, blueprint: &SessionBlueprint) -> Result<String, ContractError> {
        match self {
            Self::Toml => toml::to_string_pretty(blueprint).map_err(|e| self.render_error(e)),
            Self::Json => serde_json::to_string_pretty(blueprint).map_err(|e| self.render_error(e)),
        }
    }

    fn parse_error<E>(self, content: &str, err: E) -> ContractError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let message = match self.locate_producer(content) {
            Some(producer) => format!("{} parse error in {producer}: {err}", self.label()),
            None => format!("{} parse error: {err}", self.label()),
        };
        ContractError::ConfigParse {
            message,
            source: Some(Box::new(err)),
        }
    }

    fn render_error(self, err: impl Display) -> ContractError {
        ContractError::config_parse(format!("{} serialize error: {err}", self.label()))
    }

    /// Find the first producer entry that does not deserialize on its own
    ///
    /// Returns `None` when the document itself is malformed or every
    /// producer is fine (the error lies elsewhere).
    fn locate_producer(self, content: &str) -> Option<String> {
        match self {
            Self::Toml => {
                let table: toml::Table = toml::from_str(content).ok()?;
                let producers = table.get("producers")?.as_array()?;
                producers.iter().enumerate().find_map(|(index, entry)| {
                    let name = entry.get("name").and_then(|n| n.as_str());
                    entry
                        .clone()
                        .try_into::<ProducerConfig>()
                        .err()
                        .map(|_| describe_producer(index, name))
                })
            }
            Self::Json => {
                let document: serde_json::Value = serde_json::from_str(content).ok()?;
                let producers = document.get("producers")?.as_array()?;
                producers.iter().enumerate().find_map(|(index, entry)| {
                    let name = entry.get("name").and_then(|n| n.as_str());
                    serde_json::from_value::<ProducerConfig>(entry.clone())
                        .err()
                        .map(|_| describe_producer(index, name))
                })
            }
        }
    }
}

fn describe_producer(index: usize, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("producer #{index} ('{name}')"),
        None => format!("producer #{index}"),
    }
}
