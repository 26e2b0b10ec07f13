//! Experiment and run records
//!
//! A run is one training execution; it accumulates params, metrics and
//! artifact paths, and is persisted through [`LocalStorage`] when it ends.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use super::storage::LocalStorage;
use crate::error::{CuveeError, Result};

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

/// One recorded training execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub run_id: String,
    pub run_name: String,
    /// Unix seconds
    pub start_time: u64,
    pub end_time: Option<u64>,
    pub status: RunStatus,
    pub params: HashMap<String, String>,
    pub metrics: HashMap<String, f64>,
    pub artifacts: Vec<String>,
}

/// Named collection of runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    pub experiment_id: String,
    pub name: String,
    pub created_at: u64,
    pub runs: Vec<Run>,
    pub tags: HashMap<String, String>,
}

impl Experiment {
    /// Most recently started run, if any.
    pub fn latest_run(&self) -> Option<&Run> {
        self.runs.last()
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveRun {
    experiment_idx: usize,
    run_idx: usize,
}

/// File-backed experiment tracker.
///
/// All logging targets the active run opened by [`start_run`]; the store
/// is written when the run ends.
///
/// [`start_run`]: ExperimentTracker::start_run
pub struct ExperimentTracker {
    storage: LocalStorage,
    experiments: Vec<Experiment>,
    active: Option<ActiveRun>,
}

impl ExperimentTracker {
    /// Open the store under `output_dir`, loading any existing records.
    pub fn with_dir(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let storage = LocalStorage::new(output_dir);
        let experiments = storage.load_experiments()?;
        Ok(Self {
            storage,
            experiments,
            active: None,
        })
    }

    /// Create an experiment, or reuse an existing one with the same name.
    pub fn create_experiment(&mut self, name: &str) -> Result<String> {
        if let Some(exp) = self.experiments.iter().find(|e| e.name == name) {
            return Ok(exp.experiment_id.clone());
        }

        let experiment_id = format!("exp-{}", self.experiments.len() + 1);
        self.experiments.push(Experiment {
            experiment_id: experiment_id.clone(),
            name: name.to_string(),
            created_at: current_timestamp(),
            runs: Vec::new(),
            tags: HashMap::new(),
        });
        debug!(experiment_id = %experiment_id, name, "experiment created");
        Ok(experiment_id)
    }

    /// Start a run; subsequent logging targets it until the run ends.
    pub fn start_run(&mut self, experiment_id: &str, run_name: &str) -> Result<String> {
        let experiment_idx = self
            .experiments
            .iter()
            .position(|e| e.experiment_id == experiment_id)
            .ok_or_else(|| {
                CuveeError::TrackingError(format!("unknown experiment: {}", experiment_id))
            })?;

        let experiment = &mut self.experiments[experiment_idx];
        let run_id = format!("{}-run-{}", experiment.experiment_id, experiment.runs.len() + 1);
        experiment.runs.push(Run {
            run_id: run_id.clone(),
            run_name: run_name.to_string(),
            start_time: current_timestamp(),
            end_time: None,
            status: RunStatus::Running,
            params: HashMap::new(),
            metrics: HashMap::new(),
            artifacts: Vec::new(),
        });

        self.active = Some(ActiveRun {
            experiment_idx,
            run_idx: experiment.runs.len() - 1,
        });
        debug!(run_id = %run_id, "run started");
        Ok(run_id)
    }

    pub fn log_param(&mut self, name: &str, value: impl Display) -> Result<()> {
        let run = self.active_run_mut()?;
        run.params.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn log_params<I>(&mut self, params: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let run = self.active_run_mut()?;
        run.params.extend(params);
        Ok(())
    }

    pub fn log_metric(&mut self, name: &str, value: f64) -> Result<()> {
        let run = self.active_run_mut()?;
        run.metrics.insert(name.to_string(), value);
        Ok(())
    }

    pub fn log_artifact(&mut self, path: &Path) -> Result<()> {
        let run = self.active_run_mut()?;
        run.artifacts.push(path.display().to_string());
        Ok(())
    }

    /// Close the active run as finished and persist the store.
    pub fn end_run_success(&mut self) -> Result<()> {
        self.end_run(RunStatus::Finished)
    }

    /// Close the active run as failed and persist the store.
    pub fn end_run_failed(&mut self) -> Result<()> {
        self.end_run(RunStatus::Failed)
    }

    /// Look up an experiment by name.
    pub fn experiment(&self, name: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|e| e.name == name)
    }

    fn end_run(&mut self, status: RunStatus) -> Result<()> {
        let run = self.active_run_mut()?;
        run.status = status;
        run.end_time = Some(current_timestamp());
        let run_id = run.run_id.clone();
        self.active = None;

        self.storage.save_experiments(&self.experiments)?;
        debug!(run_id = %run_id, ?status, "run ended");
        Ok(())
    }

    fn active_run_mut(&mut self) -> Result<&mut Run> {
        let active = self
            .active
            .ok_or_else(|| CuveeError::TrackingError("no active run".to_string()))?;
        Ok(&mut self.experiments[active.experiment_idx].runs[active.run_idx])
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_lifecycle_persists() {
        let dir = TempDir::new().unwrap();

        let mut tracker = ExperimentTracker::with_dir(dir.path()).unwrap();
        let exp_id = tracker.create_experiment("wine-quality").unwrap();
        tracker.start_run(&exp_id, "training").unwrap();
        tracker.log_param("RandomForest_n_estimators", 100).unwrap();
        tracker.log_metric("RandomForest_best_mse", 0.42).unwrap();
        tracker.log_artifact(Path::new("models/best_model.bin")).unwrap();
        tracker.end_run_success().unwrap();

        let reloaded = ExperimentTracker::with_dir(dir.path()).unwrap();
        let experiment = reloaded.experiment("wine-quality").unwrap();
        let run = experiment.latest_run().unwrap();

        assert_eq!(run.status, RunStatus::Finished);
        assert!(run.end_time.is_some());
        assert_eq!(run.params["RandomForest_n_estimators"], "100");
        assert_eq!(run.metrics["RandomForest_best_mse"], 0.42);
        assert_eq!(run.artifacts, vec!["models/best_model.bin".to_string()]);
    }

    #[test]
    fn test_create_experiment_reuses_existing_name() {
        let dir = TempDir::new().unwrap();
        let mut tracker = ExperimentTracker::with_dir(dir.path()).unwrap();

        let first = tracker.create_experiment("wine-quality").unwrap();
        let second = tracker.create_experiment("wine-quality").unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_logging_without_active_run_fails() {
        let dir = TempDir::new().unwrap();
        let mut tracker = ExperimentTracker::with_dir(dir.path()).unwrap();

        let result = tracker.log_metric("test_mse", 1.0);
        assert!(matches!(result, Err(CuveeError::TrackingError(_))));
    }

    #[test]
    fn test_failed_run_is_recorded() {
        let dir = TempDir::new().unwrap();

        let mut tracker = ExperimentTracker::with_dir(dir.path()).unwrap();
        let exp_id = tracker.create_experiment("wine-quality").unwrap();
        tracker.start_run(&exp_id, "training").unwrap();
        tracker.end_run_failed().unwrap();

        let reloaded = ExperimentTracker::with_dir(dir.path()).unwrap();
        let run = reloaded.experiment("wine-quality").unwrap().latest_run().unwrap();
        assert_eq!(run.status, RunStatus::Failed);
    }

    #[test]
    fn test_unknown_experiment_id() {
        let dir = TempDir::new().unwrap();
        let mut tracker = ExperimentTracker::with_dir(dir.path()).unwrap();

        let result = tracker.start_run("exp-404", "training");
        assert!(matches!(result, Err(CuveeError::TrackingError(_))));
    }
}
