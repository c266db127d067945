//! Replay orchestrator - one thread per producer, one shared scribe.

use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{EditSink, ProducerConfig, SessionBlueprint};
use observability::{record_scribe_snapshot, record_submission, SubmissionAggregator};
use scribe::{Grid, GridSink, LogSink, Scribe};
use tracing::{info, info_span, warn};

use super::{ProducerStats, ReplayStats};
use crate::error::CliError;

/// Replay configuration
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// The session to replay
    pub blueprint: SessionBlueprint,

    /// Wrap the grid sink in a LogSink
    pub trace_edits: bool,

    /// Keep submitting after a rejected edit
    pub keep_going: bool,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main replay orchestrator
pub struct Replay {
    config: ReplayConfig,
}

impl Replay {
    /// Create a new replay with the given configuration
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }

    /// Run every producer to completion, then close the scribe
    pub fn run(self) -> Result<ReplayStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let grid = Grid::from_config(&blueprint.grid);
        let scribe = Scribe::with_config(self.build_sink(grid.clone()), blueprint.scribe.clone())
            .map_err(CliError::from)
            .context("Failed to open scribe")?;

        info!(
            scribe = %scribe.name(),
            sink = %scribe.sink_name(),
            producers = blueprint.producers.len(),
            edits = blueprint.edit_count(),
            "Starting replay"
        );

        let keep_going = self.config.keep_going;
        let producers = thread::scope(|s| -> Result<Vec<ProducerStats>> {
            let scribe = &scribe;
            let mut handles = Vec::with_capacity(blueprint.producers.len());
            for producer in &blueprint.producers {
                let handle = thread::Builder::new()
                    .name(producer.name.clone())
                    .spawn_scoped(s, move || run_producer(scribe, producer, keep_going))
                    .map_err(CliError::from)
                    .with_context(|| format!("Failed to spawn producer '{}'", producer.name))?;
                handles.push((producer.name.as_str(), handle));
            }

            handles
                .into_iter()
                .map(|(name, handle)| {
                    handle
                        .join()
                        .map_err(|_| anyhow::Error::from(CliError::producer_panicked(name)))
                })
                .collect()
        })?;

        scribe.close();
        let scribe_metrics = scribe.metrics();
        record_scribe_snapshot(scribe.name(), &scribe_metrics);

        Ok(ReplayStats {
            scribe: scribe.name().to_string(),
            duration: start_time.elapsed(),
            producers,
            scribe_metrics,
            grid,
        })
    }

    fn build_sink(&self, grid: Grid) -> Box<dyn EditSink> {
        let sink = GridSink::new("grid", grid);
        if self.config.trace_edits {
            Box::new(LogSink::new(sink))
        } else {
            Box::new(sink)
        }
    }
}

/// Submit one producer's edits in order
fn run_producer(scribe: &Scribe, producer: &ProducerConfig, keep_going: bool) -> ProducerStats {
    let _span = info_span!("producer", name = %producer.name).entered();
    let mut submissions = SubmissionAggregator::new();

    for edit in &producer.edits {
        let started = Instant::now();
        let result = scribe.submit(*edit);
        let latency = started.elapsed();

        record_submission(scribe.name(), &result, latency);
        submissions.update(&result, latency);

        if let Err(e) = result {
            warn!(edit_id = edit.id, error = %e, "Submission failed");
            if !keep_going {
                break;
            }
        }
    }

    ProducerStats {
        name: producer.name.clone(),
        submissions,
    }
}
