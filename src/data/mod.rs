//! Data preparation stage: raw CSV in, train/test parquet partitions out

pub mod frame;
pub mod loader;
pub mod split;

pub use frame::{column_to_array1, columns_to_array2, feature_target_split};
pub use loader::{read_csv, read_parquet, write_csv, write_parquet};
pub use split::train_test_split;

use polars::prelude::DataFrame;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;

/// Row counts reported by the preparation stage
#[derive(Debug, Clone, Copy)]
pub struct SplitSummary {
    pub total_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Load the raw CSV named by the configuration
pub fn load_raw(config: &PipelineConfig) -> Result<DataFrame> {
    loader::read_csv(&config.raw_path())
}

/// Run the preparation stage: read the raw CSV, split it, write both
/// partitions into the data directory.
pub fn prepare(config: &PipelineConfig) -> Result<SplitSummary> {
    let raw_path = config.raw_path();
    info!(path = %raw_path.display(), "loading raw dataset");
    let df = loader::read_csv(&raw_path)?;
    info!(rows = df.height(), cols = df.width(), "raw dataset loaded");

    let (mut train, mut test) =
        split::train_test_split(&df, config.data.test_size, config.data.random_state)?;

    loader::write_parquet(&mut train, &config.train_path())?;
    loader::write_parquet(&mut test, &config.test_path())?;
    info!(
        train_rows = train.height(),
        test_rows = test.height(),
        dir = %config.data.data_dir.display(),
        "partitions written"
    );

    Ok(SplitSummary {
        total_rows: df.height(),
        train_rows: train.height(),
        test_rows: test.height(),
    })
}
