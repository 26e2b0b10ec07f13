//! Command-line interface for the wine-quality pipeline

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::{data, inference, training};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}
fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}
fn muted(s: &str) -> ColoredString {
    s.truecolor(140, 140, 140)
}
fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "cuvee")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Wine-quality regression pipeline")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split the raw dataset into train/test partitions
    Prepare {
        /// Pipeline configuration file
        #[arg(short, long, default_value = "config/config.yaml")]
        config: PathBuf,
    },

    /// Grid-search the model families and persist the best one
    Train {
        /// Pipeline configuration file
        #[arg(short, long, default_value = "config/config.yaml")]
        config: PathBuf,
    },

    /// Predict the test partition with the persisted model
    Predict {
        /// Pipeline configuration file
        #[arg(short, long, default_value = "config/config.yaml")]
        config: PathBuf,

        /// Also write predictions to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_prepare(config_path: &Path) -> anyhow::Result<()> {
    section("Prepare");

    step_run("Loading configuration");
    let config = PipelineConfig::from_yaml(config_path)?;
    step_done(&config_path.display().to_string());

    step_run("Splitting dataset");
    let start = Instant::now();
    let summary = data::prepare(&config)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!("  {:<16} {}", muted("Total rows"), summary.total_rows.to_string().white());
    println!("  {:<16} {}", muted("Train rows"), summary.train_rows.to_string().white());
    println!("  {:<16} {}", muted("Test rows"), summary.test_rows.to_string().white());
    println!();
    Ok(())
}

pub fn cmd_train(config_path: &Path) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading configuration");
    let config = PipelineConfig::from_yaml(config_path)?;
    step_done(&config_path.display().to_string());

    step_run("Grid-searching model families");
    let start = Instant::now();
    let summary = training::train(&config)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!("  {:<16} {}", muted("Family"), summary.family.cyan());
    println!("  {:<16} {}", muted("CV MSE"), format!("{:.4}", summary.best_cv_mse).white().bold());
    println!("  {:<16} {}", muted("Test MSE"), format!("{:.4}", summary.test_metrics.mse).white().bold());
    println!("  {:<16} {}", muted("Test R²"), format!("{:.4}", summary.test_metrics.r2).white().bold());
    println!("  {:<16} {}", muted("Saved to"), summary.model_path.display().to_string().white());
    println!();
    Ok(())
}

pub fn cmd_predict(config_path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading configuration");
    let config = PipelineConfig::from_yaml(config_path)?;
    step_done(&config_path.display().to_string());

    let predictions = inference::predict(&config)?;

    println!();
    for value in &predictions {
        println!("{}", value);
    }
    println!();

    if let Some(path) = output {
        inference::write_predictions(&predictions, path)?;
        step_ok(&format!(
            "{} predictions written to {}",
            predictions.len(),
            path.display()
        ));
    }

    Ok(())
}
