//! Pipeline configuration loaded from YAML

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CuveeError, Result};
use crate::training::ParamGrid;

fn default_raw_file() -> String {
    "winequality-red.csv".to_string()
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/best_model.bin")
}

fn default_experiment_name() -> String {
    "wine-quality".to_string()
}

fn default_experiment_dir() -> PathBuf {
    PathBuf::from("experiments")
}

/// Dataset location and holdout split settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the raw CSV and both partitions
    pub data_dir: PathBuf,

    /// Holdout fraction, must be in (0, 1)
    pub test_size: f64,

    /// Seed for the split shuffle and model RNGs
    pub random_state: u64,

    /// Raw input file name inside `data_dir`
    #[serde(default = "default_raw_file")]
    pub raw_file: String,
}

/// Experiment tracker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Experiment name runs are recorded under
    #[serde(default = "default_experiment_name")]
    pub name: String,

    /// Directory of the tracker store
    #[serde(default = "default_experiment_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            name: default_experiment_name(),
            output_dir: default_experiment_dir(),
        }
    }
}

/// Full pipeline configuration
///
/// Passed explicitly into every stage; there is no process-global config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data: DataConfig,

    /// Target column name
    pub target: String,

    /// Where the winning model is persisted
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    #[serde(default)]
    pub experiment: ExperimentConfig,

    /// Random-forest hyperparameter grid
    #[serde(default)]
    pub rf_hp: ParamGrid,

    /// Gradient-boosting hyperparameter grid
    #[serde(default)]
    pub lgbm_hp: ParamGrid,
}

impl PipelineConfig {
    /// Load and validate a configuration file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            CuveeError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: PipelineConfig = serde_yaml::from_str(&raw).map_err(|e| {
            CuveeError::ConfigError(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.target.is_empty() {
            return Err(CuveeError::ConfigError(
                "target column name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Path to the raw input CSV
    pub fn raw_path(&self) -> PathBuf {
        self.data.data_dir.join(&self.data.raw_file)
    }

    /// Path to the training partition
    pub fn train_path(&self) -> PathBuf {
        self.data.data_dir.join("train.parquet")
    }

    /// Path to the test partition
    pub fn test_path(&self) -> PathBuf {
        self.data.data_dir.join("test.parquet")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL_YAML: &str = r#"
data:
  data_dir: data
  test_size: 0.2
  random_state: 42
target: quality
model_path: models/best_model.bin
experiment:
  name: wine-quality
  output_dir: experiments
rf_hp:
  n_estimators: [50, 100]
  max_depth: [4, 8]
lgbm_hp:
  n_estimators: [100]
  learning_rate: [0.05, 0.1]
"#;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(FULL_YAML);
        let config = PipelineConfig::from_yaml(file.path()).unwrap();

        assert_eq!(config.target, "quality");
        assert_eq!(config.data.test_size, 0.2);
        assert_eq!(config.data.random_state, 42);
        assert_eq!(config.rf_hp.len(), 2);
        assert_eq!(config.lgbm_hp["learning_rate"].len(), 2);
        assert_eq!(config.raw_path(), PathBuf::from("data/winequality-red.csv"));
        assert_eq!(config.train_path(), PathBuf::from("data/train.parquet"));
    }

    #[test]
    fn test_defaults_materialize() {
        let file = write_config(
            "data:\n  data_dir: data\n  test_size: 0.25\n  random_state: 7\ntarget: quality\n",
        );
        let config = PipelineConfig::from_yaml(file.path()).unwrap();

        assert_eq!(config.data.raw_file, "winequality-red.csv");
        assert_eq!(config.model_path, PathBuf::from("models/best_model.bin"));
        assert_eq!(config.experiment.name, "wine-quality");
        assert_eq!(config.experiment.output_dir, PathBuf::from("experiments"));
        assert!(config.rf_hp.is_empty());
        assert!(config.lgbm_hp.is_empty());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = PipelineConfig::from_yaml("no/such/config.yaml");
        assert!(matches!(result, Err(CuveeError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let file = write_config("data: [not, a, mapping");
        let result = PipelineConfig::from_yaml(file.path());
        assert!(matches!(result, Err(CuveeError::ConfigError(_))));
    }

    #[test]
    fn test_empty_target_rejected() {
        let file = write_config(
            "data:\n  data_dir: data\n  test_size: 0.2\n  random_state: 1\ntarget: \"\"\n",
        );
        let result = PipelineConfig::from_yaml(file.path());
        assert!(matches!(result, Err(CuveeError::ConfigError(_))));
    }
}
