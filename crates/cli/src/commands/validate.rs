//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::SessionBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    scribe: String,
    lock_timeout_ms: Option<u64>,
    row_width: usize,
    capacity: usize,
    producer_count: usize,
    edit_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating session");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Session validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    scribe: blueprint.scribe.name.clone(),
                    lock_timeout_ms: blueprint.scribe.lock_timeout_ms,
                    row_width: blueprint.grid.row_width,
                    capacity: blueprint.grid.capacity,
                    producer_count: blueprint.producers.len(),
                    edit_count: blueprint.edit_count(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect non-fatal issues
fn collect_warnings(blueprint: &SessionBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let grid = &blueprint.grid;

    for producer in &blueprint.producers {
        if producer.edits.is_empty() {
            warnings.push(format!("Producer '{}' has no edits", producer.name));
        }

        let outside = producer
            .edits
            .iter()
            .filter(|e| {
                e.row
                    .checked_mul(grid.row_width)
                    .and_then(|i| i.checked_add(e.col))
                    .is_none_or(|i| i >= grid.capacity)
            })
            .count();
        if outside > 0 {
            warnings.push(format!(
                "Producer '{}' has {} edit(s) outside the grid - the sink will reject them",
                producer.name, outside
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Session is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Scribe: {}", summary.scribe);
            match summary.lock_timeout_ms {
                Some(ms) => println!("  Lock timeout: {}ms", ms),
                None => println!("  Lock timeout: none (blocking)"),
            }
            println!("  Grid: {} cells, {} per row", summary.capacity, summary.row_width);
            println!("  Producers: {}", summary.producer_count);
            println!("  Edits: {}", summary.edit_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Session is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
