//! Replay statistics.

use std::time::Duration;

use observability::SubmissionAggregator;
use scribe::{Grid, MetricsSnapshot};
use serde::Serialize;

/// Submissions made by one producer thread
#[derive(Debug, Clone)]
pub struct ProducerStats {
    pub name: String,
    pub submissions: SubmissionAggregator,
}

/// Statistics from a replay run
#[derive(Debug, Clone)]
pub struct ReplayStats {
    /// Scribe name
    pub scribe: String,

    /// Wall time from start to close
    pub duration: Duration,

    /// Per-producer results, in session order
    pub producers: Vec<ProducerStats>,

    /// Counters reported by the scribe itself
    pub scribe_metrics: MetricsSnapshot,

    /// Final grid contents
    pub grid: Grid,
}

impl ReplayStats {
    /// All producers' submissions folded together
    pub fn totals(&self) -> SubmissionAggregator {
        let mut totals = SubmissionAggregator::new();
        for producer in &self.producers {
            totals.merge(&producer.submissions);
        }
        totals
    }

    /// Submissions per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.scribe_metrics.submitted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Machine-readable report
    pub fn report(&self) -> ReplayReport {
        ReplayReport {
            scribe: self.scribe.clone(),
            duration_ms: self.duration.as_secs_f64() * 1000.0,
            submitted: self.scribe_metrics.submitted,
            applied: self.scribe_metrics.applied,
            apply_failed: self.scribe_metrics.apply_failed,
            rejected_closed: self.scribe_metrics.rejected_closed,
            lock_timeouts: self.scribe_metrics.lock_timeouts,
            producers: self
                .producers
                .iter()
                .map(|p| ProducerReport {
                    name: p.name.clone(),
                    submitted: p.submissions.total(),
                    succeeded: p.submissions.count("success"),
                })
                .collect(),
            grid: self.grid.render().lines().map(str::to_string).collect(),
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Replay: {} ===\n", self.scribe);

        print!("{}", self.grid.render());

        println!("\nOverview");
        println!("   Duration: {:.3}ms", self.duration.as_secs_f64() * 1000.0);
        println!("   Submitted: {}", self.scribe_metrics.submitted);
        println!("   Applied: {}", self.scribe_metrics.applied);
        println!("   Rejected by sink: {}", self.scribe_metrics.apply_failed);
        println!("   Rejected (closed/timeout): {}", self.scribe_metrics.rejected());
        println!("   Throughput: {:.2}/s", self.throughput());

        println!("\nProducers");
        for producer in &self.producers {
            println!(
                "   {}: {}/{} succeeded",
                producer.name,
                producer.submissions.count("success"),
                producer.submissions.total()
            );
        }

        println!("\n{}", self.totals().summary());
    }
}

/// JSON report of a replay run
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub scribe: String,
    pub duration_ms: f64,
    pub submitted: u64,
    pub applied: u64,
    pub apply_failed: u64,
    pub rejected_closed: u64,
    pub lock_timeouts: u64,
    pub producers: Vec<ProducerReport>,
    pub grid: Vec<String>,
}

/// Per-producer part of a [`ReplayReport`]
#[derive(Debug, Serialize)]
pub struct ProducerReport {
    pub name: String,
    pub submitted: u64,
    pub succeeded: u64,
}
