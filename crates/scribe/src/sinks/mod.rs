//! Sink implementations
//!
//! Contains GridSink, LogSink, and FnSink.

mod func;
mod grid;
mod log;

pub use self::func::FnSink;
pub use self::grid::{Grid, GridSink};
pub use self::log::LogSink;
