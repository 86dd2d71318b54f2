//! Command-line interface
//!
//! Feature engineering, importance preview, sample data generation and the
//! rule-based hit score.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::FeatureConfig;
use crate::features::{has_column, missing_columns, EngineeredTable, FeatureEngineer, AUDIO_FEATURES};
use crate::importance::{ImportancePreview, ImportanceReport};
use crate::scoring::{hit_score, Verdict};
use crate::synthetic::SongGenerator;
use crate::utils::{resolve_input, DataLoader, DataSaver};

/// Config file picked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/data_config.yaml";

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<20} {}", muted(key), val.white());
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
#[command(name = "spotify-features")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Feature engineering for song hit prediction")]
#[command(long_about = None)]
pub struct Cli {
    /// YAML config file (defaults to config/data_config.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Engineer features and save the extended table
    Engineer {
        /// Input CSV; falls back to the configured path, then the candidate list
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Output CSV
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Label out-of-range values with the nearest bucket instead of null
        #[arg(long)]
        clamp_out_of_range: bool,
    },

    /// Rank engineered features by correlation with the target
    Preview {
        /// Input CSV
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name
        #[arg(short, long)]
        target: Option<String>,

        /// Number of features to show
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Write a synthetic song table with a hit label
    Sample {
        /// Output CSV
        #[arg(short, long)]
        output: PathBuf,

        /// Number of songs
        #[arg(short, long, default_value = "500")]
        rows: usize,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Rule-based hit score from three sliders in [0, 1]
    Score {
        #[arg(long, default_value = "0.5")]
        danceability: f64,

        #[arg(long, default_value = "0.5")]
        energy: f64,

        #[arg(long, default_value = "0.5")]
        valence: f64,
    },

    /// Show table shape and which features it supports
    Info {
        /// Input CSV
        #[arg(short, long)]
        data: PathBuf,
    },
}

// ─── Config ────────────────────────────────────────────────────────────────────

/// Explicit config file, else the default file if present, else defaults
pub fn load_config(path: Option<&Path>) -> anyhow::Result<FeatureConfig> {
    match path {
        Some(path) => Ok(FeatureConfig::from_yaml_file(path)?),
        None if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
            Ok(FeatureConfig::from_yaml_file(DEFAULT_CONFIG_PATH)?)
        }
        None => Ok(FeatureConfig::default()),
    }
}

// ─── Reporting ─────────────────────────────────────────────────────────────────

fn print_stages(result: &EngineeredTable) {
    for report in &result.reports {
        println!();
        println!("  {}", accent(&report.kind.to_string()));
        for name in &report.created {
            step_ok(name);
        }
        for skipped in &report.skipped {
            println!("  {} {} {}", dim("-"), dim(&skipped.name), dim(&format!("({})", skipped.reason)));
        }
    }
}

fn print_importance(report: Option<&ImportanceReport>) {
    section("Feature importance preview");
    match report {
        Some(report) if report.ranked.is_empty() => {
            println!("  {}", "No numeric feature has a defined correlation".yellow());
        }
        Some(report) => {
            println!("  {}", muted(&format!("Top features correlated with {}", report.target)));
            for entry in &report.ranked {
                println!("  {:<25} {}", entry.feature, format!("{:.3}", entry.abs_correlation).white().bold());
            }
        }
        None => println!("  {}", "No target column found, skipping importance preview".yellow()),
    }
    println!();
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_engineer(
    config: &FeatureConfig,
    data_path: Option<&Path>,
    output_path: Option<&Path>,
) -> anyhow::Result<()> {
    section("Feature engineering");

    let input = resolve_input(config, data_path)?;
    step_run(&format!("Loading {}", input.display()));
    let start = Instant::now();
    let df = DataLoader::new().load_auto(&input)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    step_run("Engineering features");
    let start = Instant::now();
    let result = FeatureEngineer::from_config(config).create_all_features(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    print_stages(&result);

    println!();
    kv("Original features", &result.original_columns.to_string());
    kv("New features", &result.new_columns().to_string());
    kv("Total features", &result.total_columns().to_string());

    let report = ImportancePreview::from_config(config).compute(&result.table)?;
    print_importance(report.as_ref());

    let output = output_path.unwrap_or(&config.output_path);
    step_run(&format!("Saving → {}", output.display()));
    let mut table = result.into_table();
    DataSaver::save_csv(&mut table, output)?;
    step_done(&format!("{} rows × {} cols", table.height(), table.width()));

    println!();
    Ok(())
}

pub fn cmd_preview(
    config: &FeatureConfig,
    data_path: &Path,
    target: Option<&str>,
    top_k: Option<usize>,
) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(target) = target {
        config = config.with_target_column(target);
    }
    if let Some(k) = top_k {
        config = config.with_top_k(k);
    }
    config.validate()?;

    let df = DataLoader::new().load_auto(data_path)?;
    let result = FeatureEngineer::from_config(&config).create_all_features(&df)?;

    let preview = ImportancePreview::from_config(&config);
    let report = preview.compute(&result.table)?;
    print_importance(report.as_ref());
    Ok(())
}

pub fn cmd_sample(output_path: &Path, rows: usize, seed: u64) -> anyhow::Result<()> {
    section("Sample data");

    step_run(&format!("Generating {} songs", rows));
    let mut df = SongGenerator::new(rows).with_seed(seed).generate()?;
    step_done(&format!("seed {}", seed));

    step_run(&format!("Saving → {}", output_path.display()));
    DataSaver::save_csv(&mut df, output_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    println!();
    Ok(())
}

pub fn cmd_score(danceability: f64, energy: f64, valence: f64) -> anyhow::Result<()> {
    section("Hit score");

    let result = hit_score(danceability, energy, valence);
    let score = format!("{:.1}%", result.score * 100.0);
    match result.verdict {
        Verdict::PotentialHit => println!("  {} {}", ok("Potential hit!"), score.white().bold()),
        Verdict::NeedsWork => println!("  {} {}", "Needs work.".yellow(), score.white().bold()),
    }

    println!();
    Ok(())
}

pub fn cmd_info(config: &FeatureConfig, data_path: &Path) -> anyhow::Result<()> {
    section("Info");

    let df = DataLoader::new().load_auto(data_path)?;
    kv("Rows", &df.height().to_string());
    kv("Columns", &df.width().to_string());
    kv(
        "Has target",
        if has_column(&df, &config.target_column) { "yes" } else { "no" },
    );

    let missing = missing_columns(&df, &AUDIO_FEATURES);
    kv(
        "Audio fields",
        &format!("{}/{}", AUDIO_FEATURES.len() - missing.len(), AUDIO_FEATURES.len()),
    );
    if !missing.is_empty() {
        kv("Missing", &missing.join(", "));
    }

    let result = FeatureEngineer::from_config(config).create_all_features(&df)?;
    print_stages(&result);

    println!();
    Ok(())
}
