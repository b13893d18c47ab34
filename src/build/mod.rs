//! Build orchestration: incremental compiles, folder builders, clean, run.

pub mod clean;
pub mod core;
pub mod run;

pub use clean::clean;
pub use core::{build_project, build_target};
