//! Inference stage
//!
//! Loads the persisted model artifact and produces row-aligned
//! predictions for a feature frame.

use polars::prelude::*;
use std::path::Path;
use tracing::info;

use crate::config::PipelineConfig;
use crate::data::{columns_to_array2, read_parquet, write_csv};
use crate::error::Result;
use crate::model::ModelArtifact;

pub use crate::model::load_model;

/// Predict one value per row of `features`.
///
/// Feature columns are picked by the names stored in the artifact, so
/// the frame's column order does not matter and extra columns are
/// ignored. A feature column the frame lacks is a `ColumnNotFound`
/// error.
pub fn generate_predictions(artifact: &ModelArtifact, features: &DataFrame) -> Result<Vec<f64>> {
    let x = columns_to_array2(features, &artifact.metadata.feature_names)?;
    let model = artifact.model()?;
    let predictions = model.predict(&x)?;
    Ok(predictions.to_vec())
}

/// Run the inference stage.
///
/// Loads the model from `model_path` and the test partition from the
/// data directory, drops the target column if it is present, and
/// returns the predictions.
pub fn predict(config: &PipelineConfig) -> Result<Vec<f64>> {
    let artifact = load_model(&config.model_path)?;
    info!(
        family = %artifact.metadata.family,
        path = %config.model_path.display(),
        "model loaded"
    );

    let mut df = read_parquet(&config.test_path())?;
    if df
        .get_column_names()
        .iter()
        .any(|n| n.as_str() == config.target.as_str())
    {
        df = df.drop(&config.target)?;
    }

    let predictions = generate_predictions(&artifact, &df)?;
    info!(rows = predictions.len(), "predictions generated");
    Ok(predictions)
}

/// Write predictions as a one-column CSV
pub fn write_predictions(predictions: &[f64], path: &Path) -> Result<()> {
    let mut df = df!("prediction" => predictions)?;
    write_csv(&mut df, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CuveeError;
    use crate::model::ModelMetadata;
    use crate::training::family::TrainedModel;
    use crate::training::metrics::RegressionReport;
    use crate::training::random_forest::RandomForestRegressor;
    use ndarray::{Array1, Array2};
    use std::collections::BTreeMap;

    fn fitted_artifact() -> ModelArtifact {
        let x = Array2::from_shape_vec(
            (4, 2),
            vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0],
        )
        .unwrap();
        let y = Array1::from_vec(vec![11.0, 22.0, 33.0, 44.0]);
        let mut forest = RandomForestRegressor::new(5).with_random_state(7);
        forest.fit(&x, &y).unwrap();

        let metadata = ModelMetadata {
            family: "RandomForest".to_string(),
            feature_names: vec!["alcohol".to_string(), "sulphates".to_string()],
            target_name: "quality".to_string(),
            hyperparameters: BTreeMap::new(),
            metrics: RegressionReport {
                mse: 0.0,
                rmse: 0.0,
                mae: 0.0,
                r2: 1.0,
            },
            trained_at: 0,
        };
        ModelArtifact::new(metadata, &TrainedModel::RandomForest(forest)).unwrap()
    }

    #[test]
    fn test_predictions_are_row_aligned() {
        let artifact = fitted_artifact();
        let df = df!(
            "alcohol" => [1.0, 2.0, 3.0],
            "sulphates" => [10.0, 20.0, 30.0],
        )
        .unwrap();

        let predictions = generate_predictions(&artifact, &df).unwrap();
        assert_eq!(predictions.len(), df.height());
    }

    #[test]
    fn test_column_order_does_not_matter() {
        let artifact = fitted_artifact();
        let in_order = df!(
            "alcohol" => [1.0, 4.0],
            "sulphates" => [10.0, 40.0],
        )
        .unwrap();
        let reordered = df!(
            "sulphates" => [10.0, 40.0],
            "alcohol" => [1.0, 4.0],
        )
        .unwrap();

        let a = generate_predictions(&artifact, &in_order).unwrap();
        let b = generate_predictions(&artifact, &reordered).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let artifact = fitted_artifact();
        let df = df!(
            "alcohol" => [1.0, 2.0],
            "sulphates" => [10.0, 20.0],
            "bottled_on" => [2021i64, 2022],
        )
        .unwrap();

        let predictions = generate_predictions(&artifact, &df).unwrap();
        assert_eq!(predictions.len(), 2);
    }

    #[test]
    fn test_missing_feature_column_is_reported() {
        let artifact = fitted_artifact();
        let df = df!("alcohol" => [1.0, 2.0]).unwrap();

        match generate_predictions(&artifact, &df) {
            Err(CuveeError::ColumnNotFound(name)) => assert_eq!(name, "sulphates"),
            other => panic!("expected ColumnNotFound, got {:?}", other),
        }
    }
}
