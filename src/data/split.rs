//! Seeded holdout split

use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{CuveeError, Result};

/// Split a frame into train and test partitions.
///
/// Row indices are shuffled with a ChaCha8 generator seeded from
/// `random_state`; the first `ceil(n * test_size)` shuffled indices become
/// the test partition and the rest the train partition. The same inputs
/// produce the same partitions on every run and platform.
pub fn train_test_split(
    df: &DataFrame,
    test_size: f64,
    random_state: u64,
) -> Result<(DataFrame, DataFrame)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(CuveeError::SplitError(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }

    let n = df.height();
    if n == 0 {
        return Err(CuveeError::SplitError(
            "cannot split an empty frame".to_string(),
        ));
    }

    let n_test = ((n as f64) * test_size).ceil() as usize;
    if n_test >= n {
        return Err(CuveeError::SplitError(format!(
            "test_size {test_size} leaves no training rows for {n} rows"
        )));
    }

    let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(random_state);
    indices.shuffle(&mut rng);

    let test_idx = IdxCa::from_vec("idx".into(), indices[..n_test].to_vec());
    let train_idx = IdxCa::from_vec("idx".into(), indices[n_test..].to_vec());

    let test = df.take(&test_idx)?;
    let train = df.take(&train_idx)?;
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_row_frame() -> DataFrame {
        let ids: Vec<i64> = (0..10).collect();
        df!("id" => ids).unwrap()
    }

    fn collect_ids(df: &DataFrame) -> Vec<i64> {
        df.column("id")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_split_sizes() {
        let df = ten_row_frame();
        let (train, test) = train_test_split(&df, 0.2, 42).unwrap();

        assert_eq!(train.height(), 8);
        assert_eq!(test.height(), 2);
    }

    #[test]
    fn test_split_is_deterministic() {
        let df = ten_row_frame();
        let (train_a, test_a) = train_test_split(&df, 0.2, 42).unwrap();
        let (train_b, test_b) = train_test_split(&df, 0.2, 42).unwrap();

        assert!(train_a.equals(&train_b));
        assert!(test_a.equals(&test_b));
    }

    #[test]
    fn test_partitions_disjoint_and_exhaustive() {
        let df = ten_row_frame();
        let (train, test) = train_test_split(&df, 0.3, 7).unwrap();

        let mut ids = collect_ids(&train);
        ids.extend(collect_ids(&test));
        ids.sort_unstable();
        assert_eq!(ids, (0..10).collect::<Vec<i64>>());
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let df = ten_row_frame();
        for bad in [0.0, 1.0, -0.3, 1.5] {
            let result = train_test_split(&df, bad, 42);
            assert!(
                matches!(result, Err(CuveeError::SplitError(_))),
                "fraction {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_frame_rejected() {
        let df = DataFrame::empty();
        let result = train_test_split(&df, 0.2, 42);
        assert!(matches!(result, Err(CuveeError::SplitError(_))));
    }

    #[test]
    fn test_tiny_frame_keeps_training_rows() {
        let df = df!("id" => [0i64, 1]).unwrap();
        let result = train_test_split(&df, 0.9, 42);
        assert!(matches!(result, Err(CuveeError::SplitError(_))));
    }
}
