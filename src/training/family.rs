//! Model families competing in the training stage

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::gbdt::GradientBoostingRegressor;
use super::grid::ParamSet;
use super::random_forest::RandomForestRegressor;
use crate::error::{CuveeError, Result};

/// A model family competing in the grid search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelFamily {
    RandomForest,
    GradientBoosting,
}

impl ModelFamily {
    /// Stable name used in tracker keys and artifact metadata
    pub fn name(&self) -> &'static str {
        match self {
            ModelFamily::RandomForest => "RandomForest",
            ModelFamily::GradientBoosting => "GradientBoosting",
        }
    }

    /// Build a model from one grid combination and fit it.
    ///
    /// Parameter names outside the family's vocabulary are rejected before
    /// any fitting happens.
    pub fn fit(
        &self,
        params: &ParamSet,
        seed: u64,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<TrainedModel> {
        match self {
            ModelFamily::RandomForest => {
                let mut model = build_forest(params, seed)?;
                model.fit(x, y)?;
                Ok(TrainedModel::RandomForest(model))
            }
            ModelFamily::GradientBoosting => {
                let mut model = build_gbdt(params, seed)?;
                model.fit(x, y)?;
                Ok(TrainedModel::GradientBoosting(model))
            }
        }
    }
}

/// A fitted model of either family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    RandomForest(RandomForestRegressor),
    GradientBoosting(GradientBoostingRegressor),
}

impl TrainedModel {
    /// Predict one value per input row
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedModel::RandomForest(m) => m.predict(x),
            TrainedModel::GradientBoosting(m) => m.predict(x),
        }
    }

    /// Family this model belongs to
    pub fn family(&self) -> ModelFamily {
        match self {
            TrainedModel::RandomForest(_) => ModelFamily::RandomForest,
            TrainedModel::GradientBoosting(_) => ModelFamily::GradientBoosting,
        }
    }
}

fn positive(name: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(CuveeError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: "must be positive".to_string(),
        });
    }
    Ok(value)
}

fn build_forest(params: &ParamSet, seed: u64) -> Result<RandomForestRegressor> {
    for (name, value) in params.iter() {
        match name.as_str() {
            "n_estimators" | "max_depth" | "min_samples_split" | "min_samples_leaf" => {}
            _ => {
                return Err(CuveeError::InvalidParameter {
                    name: name.clone(),
                    value: value.to_string(),
                    reason: "not a random-forest parameter".to_string(),
                });
            }
        }
    }

    let n_estimators = positive(
        "n_estimators",
        params.usize_value("n_estimators")?.unwrap_or(100),
    )?;
    let mut model = RandomForestRegressor::new(n_estimators).with_random_state(seed);

    if let Some(depth) = params.usize_value("max_depth")? {
        model = model.with_max_depth(positive("max_depth", depth)?);
    }
    if let Some(min_split) = params.usize_value("min_samples_split")? {
        model = model.with_min_samples_split(min_split);
    }
    if let Some(min_leaf) = params.usize_value("min_samples_leaf")? {
        model = model.with_min_samples_leaf(positive("min_samples_leaf", min_leaf)?);
    }

    Ok(model)
}

fn build_gbdt(params: &ParamSet, seed: u64) -> Result<GradientBoostingRegressor> {
    for (name, value) in params.iter() {
        match name.as_str() {
            "n_estimators" | "learning_rate" | "max_depth" | "min_samples_leaf"
            | "subsample" => {}
            _ => {
                return Err(CuveeError::InvalidParameter {
                    name: name.clone(),
                    value: value.to_string(),
                    reason: "not a gradient-boosting parameter".to_string(),
                });
            }
        }
    }

    let n_estimators = positive(
        "n_estimators",
        params.usize_value("n_estimators")?.unwrap_or(100),
    )?;
    let mut model = GradientBoostingRegressor::new(n_estimators).with_random_state(seed);

    if let Some(lr) = params.f64_value("learning_rate")? {
        if lr <= 0.0 {
            return Err(CuveeError::InvalidParameter {
                name: "learning_rate".to_string(),
                value: lr.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        model = model.with_learning_rate(lr);
    }
    if let Some(depth) = params.usize_value("max_depth")? {
        model = model.with_max_depth(positive("max_depth", depth)?);
    }
    if let Some(min_leaf) = params.usize_value("min_samples_leaf")? {
        model = model.with_min_samples_leaf(positive("min_samples_leaf", min_leaf)?);
    }
    if let Some(fraction) = params.f64_value("subsample")? {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(CuveeError::InvalidParameter {
                name: "subsample".to_string(),
                value: fraction.to_string(),
                reason: "must be in (0, 1]".to_string(),
            });
        }
        model = model.with_subsample(fraction);
    }

    Ok(model)
}
