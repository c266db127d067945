//! Command implementations.

mod run;
mod validate;

pub use run::run_replay;
pub use validate::run_validate;
