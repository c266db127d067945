//! Scribe metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome counters for a single scribe
#[derive(Debug, Default)]
pub struct ScribeMetrics {
    /// Total submit calls
    submitted: AtomicU64,
    /// Edits the sink accepted
    applied: AtomicU64,
    /// Edits the sink rejected
    apply_failed: AtomicU64,
    /// Submissions rejected because the scribe was closed
    rejected_closed: AtomicU64,
    /// Timed acquisitions that gave up
    lock_timeouts: AtomicU64,
}

impl ScribeMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn inc_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::Relaxed)
    }

    pub fn inc_applied(&self) {
        self.applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn apply_failed(&self) -> u64 {
        self.apply_failed.load(Ordering::Relaxed)
    }

    pub fn inc_apply_failed(&self) {
        self.apply_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rejected_closed(&self) -> u64 {
        self.rejected_closed.load(Ordering::Relaxed)
    }

    pub fn inc_rejected_closed(&self) {
        self.rejected_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn lock_timeouts(&self) -> u64 {
        self.lock_timeouts.load(Ordering::Relaxed)
    }

    pub fn inc_lock_timeouts(&self) {
        self.lock_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submitted: self.submitted(),
            applied: self.applied(),
            apply_failed: self.apply_failed(),
            rejected_closed: self.rejected_closed(),
            lock_timeouts: self.lock_timeouts(),
        }
    }
}

/// Snapshot of scribe metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub submitted: u64,
    pub applied: u64,
    pub apply_failed: u64,
    pub rejected_closed: u64,
    pub lock_timeouts: u64,
}

impl MetricsSnapshot {
    /// Submissions that reached the sink
    pub fn dispatched(&self) -> u64 {
        self.applied + self.apply_failed
    }

    /// Submissions that never reached the sink
    pub fn rejected(&self) -> u64 {
        self.rejected_closed + self.lock_timeouts
    }
}
