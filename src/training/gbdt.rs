//! Gradient boosted regression trees

use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::decision_tree::RegressionTree;
use crate::error::{CuveeError, Result};

/// Gradient boosting regressor
///
/// Starts from the target mean, then each round fits a shallow tree to the
/// current residuals and adds its prediction scaled by the learning rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    trees: Vec<RegressionTree>,
    initial_prediction: f64,
    /// Number of boosting rounds
    pub n_estimators: usize,
    /// Shrinkage applied to every tree's contribution
    pub learning_rate: f64,
    /// Depth of each round's tree
    pub max_depth: usize,
    /// Minimum rows on each side of a split
    pub min_samples_leaf: usize,
    /// Row fraction each tree is fitted on (1.0 = all rows)
    pub subsample: f64,
    /// Seed for the subsampling RNG
    pub random_state: Option<u64>,
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        Self::new(100)
    }
}

impl GradientBoostingRegressor {
    /// Create an unfitted model with the given number of rounds
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            initial_prediction: 0.0,
            n_estimators,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            subsample: 1.0,
            random_state: None,
        }
    }

    /// Set the learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Set the per-round tree depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum rows on each side of a split
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set the row subsampling fraction
    pub fn with_subsample(mut self, fraction: f64) -> Self {
        self.subsample = fraction;
        self
    }

    /// Set the subsampling seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Fit the model to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(CuveeError::ShapeError {
                expected: format!("{} target rows", n_samples),
                actual: format!("{} target rows", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(CuveeError::TrainingError(
                "cannot fit a boosted model on zero rows".to_string(),
            ));
        }

        self.initial_prediction = y.mean().unwrap_or(0.0);
        self.trees = Vec::with_capacity(self.n_estimators);

        let mut predictions = Array1::from_elem(n_samples, self.initial_prediction);
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(42));

        for _ in 0..self.n_estimators {
            let residuals: Array1<f64> = y
                .iter()
                .zip(predictions.iter())
                .map(|(yi, pi)| yi - pi)
                .collect();

            let mut tree = RegressionTree::new()
                .with_max_depth(self.max_depth)
                .with_min_samples_leaf(self.min_samples_leaf);

            if self.subsample < 1.0 {
                let indices = subsample_indices(n_samples, self.subsample, &mut rng);
                let x_sub = x.select(Axis(0), &indices);
                let r_sub =
                    Array1::from_vec(indices.iter().map(|&i| residuals[i]).collect());
                tree.fit(&x_sub, &r_sub)?;
            } else {
                tree.fit(x, &residuals)?;
            }

            // Running predictions track every row, sampled or not
            let tree_pred = tree.predict(x)?;
            for i in 0..n_samples {
                predictions[i] += self.learning_rate * tree_pred[i];
            }

            self.trees.push(tree);
        }

        Ok(())
    }

    /// Predict one value per input row
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(CuveeError::ModelNotFitted);
        }

        let n = x.nrows();
        let mut predictions = Array1::from_elem(n, self.initial_prediction);

        for tree in &self.trees {
            let tree_pred = tree.predict(x)?;
            for i in 0..n {
                predictions[i] += self.learning_rate * tree_pred[i];
            }
        }

        Ok(predictions)
    }

    /// Number of fitted rounds
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn subsample_indices(n: usize, fraction: f64, rng: &mut ChaCha8Rng) -> Vec<usize> {
    let sample_size = (((n as f64) * fraction).ceil() as usize).max(1);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(sample_size);
    indices.sort_unstable();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec((40, 2), (0..80).map(|i| i as f64 * 0.1).collect())
            .unwrap();
        let y: Array1<f64> = x
            .rows()
            .into_iter()
            .map(|row| row[0] * 2.0 + row[1] * 0.5 + 1.0)
            .collect();
        (x, y)
    }

    fn training_mse(model: &GradientBoostingRegressor, x: &Array2<f64>, y: &Array1<f64>) -> f64 {
        let predictions = model.predict(x).unwrap();
        y.iter()
            .zip(predictions.iter())
            .map(|(yi, pi)| (yi - pi).powi(2))
            .sum::<f64>()
            / y.len() as f64
    }

    #[test]
    fn test_boosting_reduces_training_error() {
        let (x, y) = linear_data();
        let mut model = GradientBoostingRegressor::new(50)
            .with_learning_rate(0.3)
            .with_random_state(42);
        model.fit(&x, &y).unwrap();

        let mse = training_mse(&model, &x, &y);
        let y_var = y.var(0.0);
        assert!(mse < y_var / 2.0, "MSE {} vs variance {}", mse, y_var);
        assert_eq!(model.n_trees(), 50);
    }

    #[test]
    fn test_more_rounds_never_hurt_training_fit() {
        let (x, y) = linear_data();

        let mut short = GradientBoostingRegressor::new(10).with_random_state(42);
        short.fit(&x, &y).unwrap();
        let mut long = GradientBoostingRegressor::new(100).with_random_state(42);
        long.fit(&x, &y).unwrap();

        assert!(training_mse(&long, &x, &y) <= training_mse(&short, &x, &y));
    }

    #[test]
    fn test_seeded_subsampling_is_deterministic() {
        let (x, y) = linear_data();

        let mut a = GradientBoostingRegressor::new(20)
            .with_subsample(0.8)
            .with_random_state(7);
        a.fit(&x, &y).unwrap();
        let mut b = GradientBoostingRegressor::new(20)
            .with_subsample(0.8)
            .with_random_state(7);
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict(&x).unwrap().to_vec(), b.predict(&x).unwrap().to_vec());
    }

    #[test]
    fn test_prediction_length_matches_rows() {
        let (x, y) = linear_data();
        let mut model = GradientBoostingRegressor::new(5).with_random_state(1);
        model.fit(&x, &y).unwrap();

        let query = x.select(Axis(0), &[0, 5, 10, 15]);
        assert_eq!(model.predict(&query).unwrap().len(), 4);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = GradientBoostingRegressor::new(5);
        let x = Array2::zeros((1, 2));
        assert!(matches!(model.predict(&x), Err(CuveeError::ModelNotFitted)));
    }
}
