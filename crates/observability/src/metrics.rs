//! Scribe metrics collection
//!
//! Publishes submission outcomes through the `metrics` facade and aggregates
//! them in memory for end-of-run summaries.

use std::collections::BTreeMap;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use scribe::{MetricsSnapshot, ScribeError};

/// Label for a submission result: `success` or the error's label
pub fn outcome_label(result: &Result<(), ScribeError>) -> &'static str {
    match result {
        Ok(()) => "success",
        Err(e) => e.as_label(),
    }
}

/// Record one submission and how long it took
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_submission;
///
/// let started = Instant::now();
/// let result = scribe.submit(edit);
/// record_submission(scribe.name(), &result, started.elapsed());
/// ```
pub fn record_submission(scribe: &str, result: &Result<(), ScribeError>, latency: Duration) {
    counter!(
        "scribe_submissions_total",
        "scribe" => scribe.to_string(),
        "outcome" => outcome_label(result)
    )
    .increment(1);

    histogram!("scribe_submit_latency_us", "scribe" => scribe.to_string())
        .record(latency.as_secs_f64() * 1_000_000.0);
}

/// Publish a scribe's counters as gauges
pub fn record_scribe_snapshot(scribe: &str, snapshot: &MetricsSnapshot) {
    let name = scribe.to_string();
    gauge!("scribe_submitted", "scribe" => name.clone()).set(snapshot.submitted as f64);
    gauge!("scribe_applied", "scribe" => name.clone()).set(snapshot.applied as f64);
    gauge!("scribe_apply_failed", "scribe" => name.clone()).set(snapshot.apply_failed as f64);
    gauge!("scribe_rejected_closed", "scribe" => name.clone())
        .set(snapshot.rejected_closed as f64);
    gauge!("scribe_lock_timeouts", "scribe" => name).set(snapshot.lock_timeouts as f64);
}

/// Per-producer submission aggregator
///
/// Aggregates outcomes and latency in memory for summary output.
#[derive(Debug, Clone, Default)]
pub struct SubmissionAggregator {
    /// Outcome label -> count
    pub outcomes: BTreeMap<&'static str, u64>,

    /// Submit latency in microseconds
    pub latency_us: RunningStats,
}

impl SubmissionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one submission
    pub fn update(&mut self, result: &Result<(), ScribeError>, latency: Duration) {
        *self.outcomes.entry(outcome_label(result)).or_insert(0) += 1;
        self.latency_us.push(latency.as_secs_f64() * 1_000_000.0);
    }

    /// Fold another aggregator into this one
    pub fn merge(&mut self, other: &SubmissionAggregator) {
        for (label, count) in &other.outcomes {
            *self.outcomes.entry(*label).or_insert(0) += count;
        }
        self.latency_us.merge(&other.latency_us);
    }

    /// Count for one outcome label
    pub fn count(&self, label: &str) -> u64 {
        self.outcomes.get(label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.outcomes.values().sum()
    }

    /// Generate summary report
    pub fn summary(&self) -> MetricsSummary {
        let total = self.total();
        let succeeded = self.count("success");
        MetricsSummary {
            total,
            succeeded,
            failure_rate: if total > 0 {
                (total - succeeded) as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            outcomes: self.outcomes.clone(),
            latency_us: StatsSummary::from(&self.latency_us),
        }
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total: u64,
    pub succeeded: u64,
    pub failure_rate: f64,
    pub outcomes: BTreeMap<&'static str, u64>,
    pub latency_us: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Submission Summary ===")?;
        writeln!(f, "Total submissions: {}", self.total)?;
        writeln!(
            f,
            "Succeeded: {} ({:.2}% failed)",
            self.succeeded, self.failure_rate
        )?;
        for (label, count) in &self.outcomes {
            writeln!(f, "  {}: {}", label, count)?;
        }
        writeln!(f, "Submit latency (us): {}", self.latency_us)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Combine two partial results (Chan et al. parallel variance)
    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        self.mean += delta * other.count as f64 / count as f64;
        self.m2 += other.m2 + delta * delta * (self.count * other.count) as f64 / count as f64;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.count = count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
