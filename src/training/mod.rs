//! Model training
//!
//! Native regression families (decision tree, random forest, gradient
//! boosting), grid search with k-fold cross-validation, and the stage
//! orchestration that ties them to the experiment tracker.

pub mod decision_tree;
pub mod family;
pub mod gbdt;
pub mod grid;
pub mod metrics;
pub mod random_forest;
pub mod search;
pub mod trainer;

pub use decision_tree::RegressionTree;
pub use family::{ModelFamily, TrainedModel};
pub use gbdt::GradientBoostingRegressor;
pub use grid::{combinations, ParamGrid, ParamSet, ParamValue};
pub use metrics::{mean_squared_error, RegressionReport};
pub use random_forest::RandomForestRegressor;
pub use search::{FamilyResult, GridSearch};
pub use trainer::{train, TrainingSummary};
