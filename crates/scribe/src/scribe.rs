//! Scribe - serializes concurrent edit submissions onto a single sink
//!
//! Every submission runs on the caller's thread. The scribe owns one lock that
//! guards its lifecycle state, the in-flight marker and the sink itself, so a
//! sink never sees two calls at once and never sees a call after `close`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, trace, warn};
use validator::Validate;

use contracts::{ContractError, Edit, EditEvent, EditSink, ScribeConfig};

use crate::error::ScribeError;
use crate::metrics::{MetricsSnapshot, ScribeMetrics};

/// Lifecycle state of a scribe
///
/// Only ever moves `Open -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScribeState {
    Open,
    Closed,
}

/// State guarded by the critical section
struct Section<S> {
    state: ScribeState,
    in_flight: bool,
    /// `None` once the scribe has been closed
    sink: Option<S>,
}

impl<S: EditSink> Section<S> {
    /// Route one edit to the sink
    ///
    /// Returns `None` without touching the sink if the scribe is closed.
    fn apply(&mut self, edit: Edit) -> Option<bool> {
        let Section {
            state,
            in_flight,
            sink,
        } = self;

        match (*state, sink.as_mut()) {
            (ScribeState::Open, Some(sink)) => {
                let _marker = InFlight::enter(in_flight);
                Some(route(sink, edit))
            }
            _ => None,
        }
    }
}

/// Marks a sink call as in flight; cleared on drop, including unwinds
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a mut bool) -> Self {
        debug_assert!(!*flag, "nested sink invocation");
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Invoke exactly one sink capability for `edit`
fn route<S: EditSink + ?Sized>(sink: &mut S, edit: Edit) -> bool {
    match edit.event {
        EditEvent::Add => sink.apply_add(edit),
        EditEvent::Delete => sink.apply_delete(edit),
    }
}

/// Builder for creating a Scribe
pub struct ScribeBuilder<S> {
    sink: S,
    config: ScribeConfig,
}

impl<S: EditSink> ScribeBuilder<S> {
    /// Create a builder with the default configuration
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            config: ScribeConfig::default(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ScribeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the scribe name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Bound every `submit` by a timed lock acquisition
    pub fn lock_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.lock_timeout_ms = Some(timeout_ms);
        self
    }

    /// Validate the configuration and open the scribe
    #[instrument(
        name = "scribe_builder_build",
        skip(self),
        fields(scribe = %self.config.name)
    )]
    pub fn build(self) -> Result<Scribe<S>, ScribeError> {
        self.config.validate().map_err(|e| {
            ScribeError::init(
                &self.config.name,
                ContractError::from_validation("scribe", &e).to_string(),
            )
        })?;

        let sink_name = self.sink.name().to_string();
        info!(
            sink = %sink_name,
            lock_timeout_ms = ?self.config.lock_timeout_ms,
            "Scribe opened"
        );

        Ok(Scribe {
            lock_timeout: self.config.lock_timeout(),
            name: self.config.name,
            sink_name,
            section: Mutex::new(Section {
                state: ScribeState::Open,
                in_flight: false,
                sink: Some(self.sink),
            }),
            closed: AtomicBool::new(false),
            metrics: ScribeMetrics::new(),
        })
    }
}

/// Serializes edits from any number of threads onto one sink
///
/// Share it by reference (`std::thread::scope`) or behind an `Arc`.
pub struct Scribe<S: EditSink = Box<dyn EditSink>> {
    name: String,
    sink_name: String,
    lock_timeout: Option<Duration>,
    section: Mutex<Section<S>>,
    /// Mirrors `Section::state` so late submitters skip the lock
    closed: AtomicBool,
    metrics: ScribeMetrics,
}

impl<S: EditSink> Scribe<S> {
    /// Open a scribe with the default configuration
    pub fn open(sink: S) -> Result<Self, ScribeError> {
        ScribeBuilder::new(sink).build()
    }

    /// Open a scribe with a custom configuration
    pub fn with_config(sink: S, config: ScribeConfig) -> Result<Self, ScribeError> {
        ScribeBuilder::new(sink).config(config).build()
    }

    /// Scribe name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the bound sink
    pub fn sink_name(&self) -> &str {
        &self.sink_name
    }

    /// Current lifecycle state
    pub fn state(&self) -> ScribeState {
        if self.closed.load(Ordering::Acquire) {
            ScribeState::Closed
        } else {
            ScribeState::Open
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state() == ScribeState::Closed
    }

    /// Get snapshot of outcome counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Submit an edit, blocking until the sink has handled it
    ///
    /// Uses a timed acquisition when the scribe was configured with a lock
    /// timeout.
    ///
    /// # Errors
    /// - `Closed` if the scribe has been closed (sink untouched)
    /// - `ApplyFailed` if the sink rejected the edit
    /// - `LockTimeout` if a configured lock timeout expired
    pub fn submit(&self, edit: Edit) -> Result<(), ScribeError> {
        if let Some(timeout) = self.lock_timeout {
            return self.submit_timeout(edit, timeout);
        }

        self.metrics.inc_submitted();
        if self.closed.load(Ordering::Acquire) {
            return Err(self.reject_closed(edit));
        }

        self.dispatch(self.section.lock(), edit)
    }

    /// Submit an edit, giving up if the critical section cannot be entered
    /// within `timeout`
    pub fn submit_timeout(&self, edit: Edit, timeout: Duration) -> Result<(), ScribeError> {
        self.metrics.inc_submitted();
        if self.closed.load(Ordering::Acquire) {
            return Err(self.reject_closed(edit));
        }

        match self.section.try_lock_for(timeout) {
            Some(section) => self.dispatch(section, edit),
            None => {
                self.metrics.inc_lock_timeouts();
                warn!(
                    scribe = %self.name,
                    edit_id = edit.id,
                    waited = ?timeout,
                    "Lock acquisition timed out"
                );
                Err(ScribeError::LockTimeout {
                    name: self.name.clone(),
                    waited: timeout,
                })
            }
        }
    }

    fn dispatch(
        &self,
        mut section: MutexGuard<'_, Section<S>>,
        edit: Edit,
    ) -> Result<(), ScribeError> {
        let outcome = section.apply(edit);
        drop(section);

        match outcome {
            Some(true) => {
                self.metrics.inc_applied();
                trace!(
                    scribe = %self.name,
                    edit_id = edit.id,
                    event = %edit.event,
                    row = edit.row,
                    col = edit.col,
                    "Edit applied"
                );
                Ok(())
            }
            Some(false) => {
                self.metrics.inc_apply_failed();
                warn!(
                    scribe = %self.name,
                    sink = %self.sink_name,
                    edit_id = edit.id,
                    event = %edit.event,
                    row = edit.row,
                    col = edit.col,
                    "Sink rejected edit"
                );
                Err(ScribeError::ApplyFailed {
                    sink: self.sink_name.clone(),
                    edit_id: edit.id,
                    event: edit.event,
                })
            }
            None => Err(self.reject_closed(edit)),
        }
    }

    fn reject_closed(&self, edit: Edit) -> ScribeError {
        self.metrics.inc_rejected_closed();
        debug!(scribe = %self.name, edit_id = edit.id, "Submission after close rejected");
        ScribeError::Closed {
            name: self.name.clone(),
            edit_id: edit.id,
        }
    }

    /// Close the scribe
    ///
    /// Waits for any in-flight sink call, flips the state to `Closed`, then
    /// releases the sink outside the critical section. Calling it again is a
    /// no-op.
    #[instrument(name = "scribe_close", skip(self), fields(scribe = %self.name))]
    pub fn close(&self) {
        let sink = {
            let mut section = self.section.lock();
            if section.state == ScribeState::Closed {
                debug!("Scribe already closed");
                return;
            }
            debug_assert!(!section.in_flight, "close raced an in-flight dispatch");

            section.state = ScribeState::Closed;
            self.closed.store(true, Ordering::Release);
            section.sink.take()
        };

        if let Some(mut sink) = sink {
            sink.close();
        }

        let snapshot = self.metrics.snapshot();
        info!(
            submitted = snapshot.submitted,
            applied = snapshot.applied,
            apply_failed = snapshot.apply_failed,
            rejected = snapshot.rejected(),
            "Scribe closed"
        );
    }
}

impl<S: EditSink> Drop for Scribe<S> {
    fn drop(&mut self) {
        if !*self.closed.get_mut() {
            self.close();
        }
    }
}

impl<S: EditSink> fmt::Debug for Scribe<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scribe")
            .field("name", &self.name)
            .field("sink", &self.sink_name)
            .field("state", &self.state())
            .field("lock_timeout", &self.lock_timeout)
            .finish()
    }
}
