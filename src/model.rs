//! Trained-model artifact format
//!
//! A saved model is a bincode container holding magic bytes, a format
//! version, descriptive metadata, the encoded model payload and an
//! FNV-1a checksum over the payload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{CuveeError, Result};
use crate::training::family::TrainedModel;
use crate::training::metrics::RegressionReport;

/// Descriptive record stored alongside the model payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Family name, e.g. "RandomForest"
    pub family: String,
    /// Training feature columns, in training order
    pub feature_names: Vec<String>,
    pub target_name: String,
    /// Winning grid combination, stringified
    pub hyperparameters: BTreeMap<String, String>,
    /// Test-partition evaluation
    pub metrics: RegressionReport,
    /// Unix seconds
    pub trained_at: u64,
}

/// On-disk model container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    magic: [u8; 4],
    format_version: u32,
    pub metadata: ModelMetadata,
    model_data: Vec<u8>,
    checksum: u64,
}

impl ModelArtifact {
    const MAGIC: [u8; 4] = *b"CUVE";
    const VERSION: u32 = 1;

    pub fn new(metadata: ModelMetadata, model: &TrainedModel) -> Result<Self> {
        let model_data = bincode::serialize(model)
            .map_err(|e| CuveeError::SerializationError(format!("model payload: {}", e)))?;
        let checksum = fnv1a(&model_data);
        Ok(Self {
            magic: Self::MAGIC,
            format_version: Self::VERSION,
            metadata,
            model_data,
            checksum,
        })
    }

    /// Decode the model payload.
    pub fn model(&self) -> Result<TrainedModel> {
        bincode::deserialize(&self.model_data)
            .map_err(|e| CuveeError::SerializationError(format!("model payload: {}", e)))
    }

    fn verify(&self) -> Result<()> {
        if self.magic != Self::MAGIC {
            return Err(CuveeError::SerializationError(
                "not a model file (bad magic bytes)".to_string(),
            ));
        }
        if self.format_version != Self::VERSION {
            return Err(CuveeError::SerializationError(format!(
                "unsupported format version {}",
                self.format_version
            )));
        }
        if fnv1a(&self.model_data) != self.checksum {
            return Err(CuveeError::SerializationError(
                "checksum mismatch, file may be corrupted".to_string(),
            ));
        }
        Ok(())
    }
}

/// Write `model` and its metadata to `path`, creating parent directories.
pub fn save_model(model: &TrainedModel, metadata: ModelMetadata, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let artifact = ModelArtifact::new(metadata, model)?;
    let file = File::create(path).map_err(|e| {
        CuveeError::IoError(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    bincode::serialize_into(BufWriter::new(file), &artifact)
        .map_err(|e| CuveeError::SerializationError(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

/// Load a model artifact from `path`.
///
/// A path that does not exist is reported as [`CuveeError::ModelNotFound`]
/// before any read is attempted, so callers can tell "never trained" apart
/// from a corrupt artifact.
pub fn load_model(path: &Path) -> Result<ModelArtifact> {
    if !path.exists() {
        return Err(CuveeError::ModelNotFound(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| {
        CuveeError::IoError(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let artifact: ModelArtifact = bincode::deserialize_from(BufReader::new(file))
        .map_err(|e| CuveeError::SerializationError(format!("{}: {}", path.display(), e)))?;
    artifact.verify()?;
    Ok(artifact)
}

/// Seconds since the Unix epoch
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// FNV-1a over the payload bytes
fn fnv1a(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;

    let mut hash = FNV_OFFSET;
    for byte in data {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::random_forest::RandomForestRegressor;
    use ndarray::{Array1, Array2};
    use tempfile::TempDir;

    fn fitted_model() -> (TrainedModel, Array2<f64>) {
        let x = Array2::from_shape_vec((8, 1), (0..8).map(f64::from).collect()).unwrap();
        let y: Array1<f64> = x.column(0).iter().map(|v| v * 2.0).collect();
        let mut forest = RandomForestRegressor::new(5).with_random_state(42);
        forest.fit(&x, &y).unwrap();
        (TrainedModel::RandomForest(forest), x)
    }

    fn sample_metadata() -> ModelMetadata {
        ModelMetadata {
            family: "RandomForest".to_string(),
            feature_names: vec!["alcohol".to_string(), "sulphates".to_string()],
            target_name: "quality".to_string(),
            hyperparameters: BTreeMap::new(),
            metrics: RegressionReport {
                mse: 0.4,
                rmse: 0.632,
                mae: 0.5,
                r2: 0.35,
            },
            trained_at: 1700000000,
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models").join("best_model.bin");
        let (model, x) = fitted_model();

        save_model(&model, sample_metadata(), &path).unwrap();
        let artifact = load_model(&path).unwrap();

        assert_eq!(artifact.metadata.family, "RandomForest");
        assert_eq!(artifact.metadata.target_name, "quality");
        assert_eq!(artifact.metadata.feature_names.len(), 2);

        let restored = artifact.model().unwrap();
        let expected = model.predict(&x).unwrap();
        let actual = restored.predict(&x).unwrap();
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_missing_path_is_model_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never_trained.bin");

        match load_model(&path) {
            Err(CuveeError::ModelNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected ModelNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupted_payload_fails_checksum() {
        let (model, _) = fitted_model();
        let mut artifact = ModelArtifact::new(sample_metadata(), &model).unwrap();

        artifact.model_data[0] ^= 0xFF;

        assert!(matches!(
            artifact.verify(),
            Err(CuveeError::SerializationError(_))
        ));
    }

    #[test]
    fn test_bad_magic_rejected() {
        let (model, _) = fitted_model();
        let mut artifact = ModelArtifact::new(sample_metadata(), &model).unwrap();

        artifact.magic = *b"XXXX";

        assert!(matches!(
            artifact.verify(),
            Err(CuveeError::SerializationError(_))
        ));
    }

    #[test]
    fn test_checksum_accepts_untouched_payload() {
        let (model, _) = fitted_model();
        let artifact = ModelArtifact::new(sample_metadata(), &model).unwrap();
        assert!(artifact.verify().is_ok());
    }
}
