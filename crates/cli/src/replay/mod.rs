//! Session replay module.

mod orchestrator;
mod stats;

pub use orchestrator::{Replay, ReplayConfig};
pub use stats::{ProducerStats, ReplayReport, ReplayStats};
