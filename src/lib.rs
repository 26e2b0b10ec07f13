//! Wine-quality regression pipeline
//!
//! Three file-mediated stages over the UCI red-wine dataset:
//!
//! - [`data`] - raw CSV in, seeded train/test parquet partitions out
//! - [`training`] - grid-searched model families, tracked and persisted
//! - [`inference`] - predictions from the persisted model artifact
//!
//! Supporting modules:
//!
//! - [`config`] - typed YAML pipeline configuration
//! - [`model`] - on-disk model artifact format
//! - [`tracking`] - local experiment store
//! - [`cli`] - command-line surface

// Core error handling
pub mod error;

// Pipeline stages
pub mod data;
pub mod inference;
pub mod training;

// Supporting infrastructure
pub mod cli;
pub mod config;
pub mod model;
pub mod tracking;

pub use error::{CuveeError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{CuveeError, Result};

    // Configuration
    pub use crate::config::PipelineConfig;

    // Data preparation
    pub use crate::data::{prepare, train_test_split, SplitSummary};

    // Training
    pub use crate::training::{
        train, GradientBoostingRegressor, GridSearch, ModelFamily, ParamGrid, ParamSet,
        RandomForestRegressor, RegressionReport, RegressionTree, TrainedModel, TrainingSummary,
    };

    // Model artifacts
    pub use crate::model::{save_model, ModelArtifact, ModelMetadata};

    // Inference
    pub use crate::inference::{generate_predictions, load_model, predict};

    // Experiment tracking
    pub use crate::tracking::{Experiment, ExperimentTracker, Run, RunStatus};
}
