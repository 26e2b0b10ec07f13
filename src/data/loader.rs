//! Reading and writing the pipeline's tabular files

use polars::prelude::*;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::{CuveeError, Result};

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        CuveeError::IoError(io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
    })
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| {
        CuveeError::IoError(io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
    })
}

/// Read a CSV file with a header row and inferred schema
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = open(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()?;
    Ok(df)
}

/// Read a parquet partition
pub fn read_parquet(path: &Path) -> Result<DataFrame> {
    let file = open(path)?;
    let df = ParquetReader::new(file).finish()?;
    Ok(df)
}

/// Write a parquet partition
pub fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = create(path)?;
    ParquetWriter::new(file).finish(df)?;
    Ok(())
}

/// Write a CSV file with a header row
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = create(path)?;
    CsvWriter::new(&mut file).finish(df)?;
    Ok(())
}
