//! # Scribe
//!
//! Edit serialization module.
//!
//! Responsibilities:
//! - Accept `Edit`s from any number of producer threads
//! - Route each edit to exactly one sink capability, one call at a time
//! - Shut down without racing in-flight writes

pub mod error;
pub mod metrics;
pub mod scribe;
pub mod sinks;

pub use contracts::{Edit, EditEvent, EditSink, ScribeConfig};
pub use error::ScribeError;
pub use metrics::{MetricsSnapshot, ScribeMetrics};
pub use scribe::{Scribe, ScribeBuilder, ScribeState};
pub use sinks::{FnSink, Grid, GridSink, LogSink};
