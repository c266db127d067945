//! # Contracts
//!
//! Shared interface contracts: the edit value, the sink trait, configuration
//! structures and the common error type.
//! Business crates depend on this crate; reverse dependencies are prohibited.

mod blueprint;
mod config;
mod edit;
mod error;
mod sink;

pub use blueprint::*;
pub use config::ScribeConfig;
pub use edit::{Edit, EditEvent};
pub use error::*;
pub use sink::EditSink;
