//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::SessionBlueprint;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::replay::{Replay, ReplayConfig};

/// Execute the `run` command
pub fn run_replay(args: &RunArgs) -> Result<()> {
    let blueprint = load_session(args)?;

    let replay = Replay::new(ReplayConfig {
        blueprint,
        trace_edits: args.trace_edits,
        keep_going: args.keep_going,
        metrics_port: (args.metrics_port != 0).then_some(args.metrics_port),
    });

    let stats = replay.run().context("Replay failed")?;

    info!(
        submitted = stats.scribe_metrics.submitted,
        applied = stats.scribe_metrics.applied,
        duration_ms = stats.duration.as_secs_f64() * 1000.0,
        "Replay completed"
    );

    if args.json {
        let json = serde_json::to_string_pretty(&stats.report())
            .context("Failed to serialize replay report")?;
        println!("{}", json);
    } else {
        stats.print_summary();
    }

    Ok(())
}

/// Load the session file and apply CLI overrides
///
/// `--lock-timeout-ms 0` switches the scribe back to blocking submits.
fn load_session(args: &RunArgs) -> Result<SessionBlueprint> {
    info!(config = %args.config.display(), "Loading session");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load session from {}", args.config.display()))?;

    if let Some(timeout_ms) = args.lock_timeout_ms {
        info!(lock_timeout_ms = timeout_ms, "Overriding lock timeout from CLI");
        blueprint.scribe.lock_timeout_ms = (timeout_ms > 0).then_some(timeout_ms);
    }
    config_loader::ConfigLoader::validate(&blueprint).context("Invalid session after overrides")?;

    info!(
        scribe = %blueprint.scribe.name,
        lock_timeout_ms = ?blueprint.scribe.lock_timeout_ms,
        producers = blueprint.producers.len(),
        edits = blueprint.edit_count(),
        "Session loaded"
    );

    Ok(blueprint)
}
