//! K-fold cross-validation and exhaustive grid search

use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::debug;

use super::family::{ModelFamily, TrainedModel};
use super::grid::{combinations, ParamGrid, ParamSet};
use super::metrics::mean_squared_error;
use crate::error::{CuveeError, Result};

/// Row indices of one cross-validation fold
#[derive(Debug, Clone)]
pub struct FoldSplit {
    pub train_indices: Vec<usize>,
    pub validation_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Contiguous k-fold assignment.
///
/// Fold sizes differ by at most one and every row lands in exactly one
/// validation fold. Rows are not shuffled, so the assignment is a pure
/// function of `n_samples` and `n_splits`.
pub fn k_fold_indices(n_samples: usize, n_splits: usize) -> Result<Vec<FoldSplit>> {
    if n_splits < 2 {
        return Err(CuveeError::TrainingError(
            "n_splits must be at least 2".to_string(),
        ));
    }
    if n_samples < n_splits {
        return Err(CuveeError::TrainingError(format!(
            "n_samples ({}) must be >= n_splits ({})",
            n_samples, n_splits
        )));
    }

    let base = n_samples / n_splits;
    let remainder = n_samples % n_splits;

    let mut splits = Vec::with_capacity(n_splits);
    let mut current = 0;
    for fold_idx in 0..n_splits {
        let fold_size = if fold_idx < remainder { base + 1 } else { base };
        let validation_indices: Vec<usize> = (current..current + fold_size).collect();
        let train_indices: Vec<usize> = (0..current)
            .chain(current + fold_size..n_samples)
            .collect();

        splits.push(FoldSplit {
            train_indices,
            validation_indices,
            fold_idx,
        });
        current += fold_size;
    }

    Ok(splits)
}

/// Outcome of one family's grid search
#[derive(Debug, Clone)]
pub struct FamilyResult {
    pub family: ModelFamily,
    /// Winning combination
    pub best_params: ParamSet,
    /// Mean cross-validated MSE of the winning combination
    pub best_cv_mse: f64,
    /// Winning combination refit on the full training partition
    pub model: TrainedModel,
}

/// Exhaustive grid search scored by k-fold cross-validated MSE
#[derive(Debug, Clone, Copy)]
pub struct GridSearch {
    pub n_folds: usize,
    /// Seed handed to every candidate model
    pub random_state: u64,
}

impl GridSearch {
    pub fn new(n_folds: usize, random_state: u64) -> Self {
        Self {
            n_folds,
            random_state,
        }
    }

    /// Evaluate every combination of `grid` for `family`.
    ///
    /// Folds are computed once and shared by all combinations, which are
    /// scored in parallel. The lowest mean MSE wins; ties go to the
    /// earliest combination. The winner is refit on all of `x`/`y`.
    pub fn run(
        &self,
        family: ModelFamily,
        grid: &ParamGrid,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<FamilyResult> {
        let combos = combinations(grid);
        if combos.is_empty() {
            return Err(CuveeError::TrainingError(format!(
                "{} grid has a parameter with no candidate values",
                family.name()
            )));
        }

        let folds = k_fold_indices(x.nrows(), self.n_folds)?;

        let scores = combos
            .par_iter()
            .map(|params| self.cv_mse(family, params, x, y, &folds))
            .collect::<Result<Vec<_>>>()?;

        // min_by keeps the first of equal elements, so the earliest
        // combination wins ties
        let (best_idx, best_cv_mse) = scores
            .iter()
            .copied()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
            .ok_or_else(|| {
                CuveeError::TrainingError("grid search produced no scores".to_string())
            })?;

        let best_params = combos[best_idx].clone();
        debug!(
            family = family.name(),
            params = %best_params,
            mse = best_cv_mse,
            "best combination found, refitting on full training data"
        );
        let model = family.fit(&best_params, self.random_state, x, y)?;

        Ok(FamilyResult {
            family,
            best_params,
            best_cv_mse,
            model,
        })
    }

    fn cv_mse(
        &self,
        family: ModelFamily,
        params: &ParamSet,
        x: &Array2<f64>,
        y: &Array1<f64>,
        folds: &[FoldSplit],
    ) -> Result<f64> {
        let mut fold_scores = Vec::with_capacity(folds.len());
        for fold in folds {
            let x_train = x.select(Axis(0), &fold.train_indices);
            let y_train = y.select(Axis(0), &fold.train_indices);
            let x_val = x.select(Axis(0), &fold.validation_indices);
            let y_val = y.select(Axis(0), &fold.validation_indices);

            let model = family.fit(params, self.random_state, &x_train, &y_train)?;
            let predictions = model.predict(&x_val)?;
            fold_scores.push(mean_squared_error(&y_val, &predictions));
        }

        let mean = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
        debug!(family = family.name(), params = %params, mse = mean, "combination scored");
        Ok(mean)
    }
}
