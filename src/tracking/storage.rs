//! Local persistence for experiment records

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use super::tracker::Experiment;
use crate::error::Result;

/// JSON file store holding every experiment under one directory
pub struct LocalStorage {
    base_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn experiments_file(&self) -> PathBuf {
        self.base_dir.join("experiments.json")
    }

    pub fn save_experiments(&self, experiments: &[Experiment]) -> Result<()> {
        fs::create_dir_all(&self.base_dir)?;
        let file = File::create(self.experiments_file())?;
        serde_json::to_writer_pretty(BufWriter::new(file), experiments)?;
        Ok(())
    }

    /// Load all experiments; a store that does not exist yet is empty.
    pub fn load_experiments(&self) -> Result<Vec<Experiment>> {
        let path = self.experiments_file();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path)?;
        let experiments = serde_json::from_reader(BufReader::new(file))?;
        Ok(experiments)
    }
}
