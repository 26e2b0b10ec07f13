//! DataFrame to ndarray conversion

use ndarray::{Array1, Array2};
use polars::prelude::*;

use crate::error::{CuveeError, Result};

/// Names of every column except `target`, in frame order
pub fn feature_names(df: &DataFrame, target: &str) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != target)
        .map(|s| s.to_string())
        .collect()
}

/// Extract one column as f64, casting integer columns as needed
pub fn column_to_array1(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    let column = df
        .column(name)
        .map_err(|_| CuveeError::ColumnNotFound(name.to_string()))?;
    let casted = column.cast(&DataType::Float64)?;
    let values: Array1<f64> = casted
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    Ok(values)
}

/// Extract named columns into a row-major matrix.
///
/// Columns are materialized one at a time since the frame stores them
/// column-major.
pub fn columns_to_array2(df: &DataFrame, names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let col_data: Vec<Vec<f64>> = names
        .iter()
        .map(|name| {
            let column = df
                .column(name)
                .map_err(|_| CuveeError::ColumnNotFound(name.clone()))?;
            let casted = column.cast(&DataType::Float64)?;
            let values: Vec<f64> = casted
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    Ok(Array2::from_shape_fn((n_rows, names.len()), |(r, c)| {
        col_data[c][r]
    }))
}

/// Split a partition into a feature matrix, target vector and feature names.
pub fn feature_target_split(
    df: &DataFrame,
    target: &str,
) -> Result<(Array2<f64>, Array1<f64>, Vec<String>)> {
    let y = column_to_array1(df, target)?;
    let names = feature_names(df, target);
    let x = columns_to_array2(df, &names)?;
    Ok((x, y, names))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wine_frame() -> DataFrame {
        df!(
            "alcohol" => [9.4, 9.8, 10.5],
            "sulphates" => [0.56, 0.68, 0.65],
            "quality" => [5i64, 5, 6],
        )
        .unwrap()
    }

    #[test]
    fn test_feature_target_split_shapes() {
        let df = wine_frame();
        let (x, y, names) = feature_target_split(&df, "quality").unwrap();

        assert_eq!(x.shape(), &[3, 2]);
        assert_eq!(y.len(), 3);
        assert_eq!(names, vec!["alcohol".to_string(), "sulphates".to_string()]);
    }

    #[test]
    fn test_integer_target_is_cast() {
        let df = wine_frame();
        let y = column_to_array1(&df, "quality").unwrap();
        assert_eq!(y.to_vec(), vec![5.0, 5.0, 6.0]);
    }

    #[test]
    fn test_rows_stay_aligned() {
        let df = wine_frame();
        let (x, _, _) = feature_target_split(&df, "quality").unwrap();

        assert_eq!(x[[0, 0]], 9.4);
        assert_eq!(x[[2, 1]], 0.65);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let df = wine_frame();
        let result = column_to_array1(&df, "density");
        match result {
            Err(CuveeError::ColumnNotFound(name)) => assert_eq!(name, "density"),
            other => panic!("expected ColumnNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_columns_selected_by_name_not_position() {
        let df = df!(
            "sulphates" => [0.56, 0.68],
            "alcohol" => [9.4, 9.8],
        )
        .unwrap();

        let names = vec!["alcohol".to_string(), "sulphates".to_string()];
        let x = columns_to_array2(&df, &names).unwrap();

        assert_eq!(x[[0, 0]], 9.4);
        assert_eq!(x[[0, 1]], 0.56);
    }
}
