//! Experiment tracking
//!
//! Records training runs (params, metrics, artifacts) in a local JSON
//! store so results can be compared across invocations.

pub mod storage;
pub mod tracker;

pub use storage::LocalStorage;
pub use tracker::{Experiment, ExperimentTracker, Run, RunStatus};
