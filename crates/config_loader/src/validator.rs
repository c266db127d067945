//! Session validation
//!
//! Rules:
//! - scribe name non-empty, lock timeout >= 1ms when set
//! - grid row_width and capacity >= 1
//! - at least one producer
//! - producer names non-empty and unique

use std::collections::HashSet;

use contracts::{ContractError, SessionBlueprint};
use ::validator::Validate;

/// Validate a SessionBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    blueprint
        .scribe
        .validate()
        .map_err(|e| ContractError::from_validation("scribe", &e))?;
    blueprint
        .grid
        .validate()
        .map_err(|e| ContractError::from_validation("grid", &e))?;
    validate_producers(blueprint)?;
    Ok(())
}

/// Producer list must be non-empty with unique, non-empty names
fn validate_producers(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    if blueprint.producers.is_empty() {
        return Err(ContractError::config_validation(
            "producers",
            "at least one producer is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, producer) in blueprint.producers.iter().enumerate() {
        if producer.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("producers[{}].name", idx),
                "producer name cannot be empty",
            ));
        }
        if !seen.insert(&producer.name) {
            return Err(ContractError::config_validation(
                format!("producers[name={}]", producer.name),
                "duplicate producer name",
            ));
        }
    }
    Ok(())
}
