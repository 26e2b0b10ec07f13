//! Training stage orchestration
//!
//! Loads the train/test partitions, grid-searches every model family,
//! records the results, then evaluates and persists the winner.

use ndarray::{Array1, Array2};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

use super::family::ModelFamily;
use super::metrics::RegressionReport;
use super::search::{FamilyResult, GridSearch};
use crate::config::PipelineConfig;
use crate::data::{feature_target_split, read_parquet};
use crate::error::{CuveeError, Result};
use crate::model::{self, save_model, ModelMetadata};
use crate::tracking::ExperimentTracker;

/// Folds used by every grid search
const CV_FOLDS: usize = 5;

/// Outcome of a completed training run
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub family: String,
    pub best_cv_mse: f64,
    pub test_metrics: RegressionReport,
    pub model_path: PathBuf,
}

/// Run the training stage end to end.
///
/// Every family in the configuration is searched; the one with the lowest
/// cross-validated MSE is evaluated on the test partition and written to
/// `model_path`. All params, metrics and the artifact path are recorded
/// in the experiment store, and the run is closed as failed if any step
/// after it starts goes wrong.
pub fn train(config: &PipelineConfig) -> Result<TrainingSummary> {
    let train_df = read_parquet(&config.train_path())?;
    let test_df = read_parquet(&config.test_path())?;
    info!(
        train_rows = train_df.height(),
        test_rows = test_df.height(),
        "partitions loaded"
    );

    let (x_train, y_train, feature_names) = feature_target_split(&train_df, &config.target)?;
    let (x_test, y_test, _) = feature_target_split(&test_df, &config.target)?;

    let mut tracker = ExperimentTracker::with_dir(&config.experiment.output_dir)?;
    let experiment_id = tracker.create_experiment(&config.experiment.name)?;
    tracker.start_run(&experiment_id, "training")?;

    let outcome = search_and_persist(
        config,
        &mut tracker,
        &x_train,
        &y_train,
        &x_test,
        &y_test,
        &feature_names,
    );

    match outcome {
        Ok(summary) => {
            tracker.end_run_success()?;
            Ok(summary)
        }
        Err(e) => {
            if let Err(track_err) = tracker.end_run_failed() {
                warn!(error = %track_err, "failed to record run failure");
            }
            Err(e)
        }
    }
}

fn search_and_persist(
    config: &PipelineConfig,
    tracker: &mut ExperimentTracker,
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
    feature_names: &[String],
) -> Result<TrainingSummary> {
    let families = [
        (ModelFamily::RandomForest, &config.rf_hp),
        (ModelFamily::GradientBoosting, &config.lgbm_hp),
    ];

    let search = GridSearch::new(CV_FOLDS, config.data.random_state);
    let mut results = Vec::with_capacity(families.len());
    for (family, grid) in families {
        info!(family = family.name(), "grid search started");
        let result = search.run(family, grid, x_train, y_train)?;
        info!(
            family = family.name(),
            cv_mse = result.best_cv_mse,
            params = %result.best_params,
            "grid search finished"
        );

        tracker.log_metric(&format!("{}_best_mse", family.name()), result.best_cv_mse)?;
        let prefixed = result
            .best_params
            .iter()
            .map(|(name, value)| (format!("{}_{}", family.name(), name), value.to_string()));
        tracker.log_params(prefixed)?;
        results.push(result);
    }

    let winner = select_winner(results)?;
    info!(
        family = winner.family.name(),
        cv_mse = winner.best_cv_mse,
        "family selected"
    );

    let predictions = winner.model.predict(x_test)?;
    let report = RegressionReport::compute(y_test, &predictions);
    tracker.log_metric("test_mse", report.mse)?;
    tracker.log_metric("test_r2", report.r2)?;
    info!(
        test_mse = report.mse,
        test_r2 = report.r2,
        "winner evaluated on test partition"
    );

    let metadata = ModelMetadata {
        family: winner.family.name().to_string(),
        feature_names: feature_names.to_vec(),
        target_name: config.target.clone(),
        hyperparameters: winner
            .best_params
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect::<BTreeMap<_, _>>(),
        metrics: report,
        trained_at: model::current_timestamp(),
    };
    save_model(&winner.model, metadata, &config.model_path)?;
    tracker.log_artifact(&config.model_path)?;
    info!(path = %config.model_path.display(), "model saved");

    Ok(TrainingSummary {
        family: winner.family.name().to_string(),
        best_cv_mse: winner.best_cv_mse,
        test_metrics: report,
        model_path: config.model_path.clone(),
    })
}

/// Lowest cross-validated MSE wins; ties keep the earlier family.
fn select_winner(results: Vec<FamilyResult>) -> Result<FamilyResult> {
    results
        .into_iter()
        .min_by(|a, b| {
            a.best_cv_mse
                .partial_cmp(&b.best_cv_mse)
                .unwrap_or(Ordering::Equal)
        })
        .ok_or_else(|| CuveeError::TrainingError("no model family was evaluated".to_string()))
}
