//! Song feature engineering
//!
//! The pipeline runs four additive stages in a fixed order:
//! - interaction features (pairwise products)
//! - composite scores (linear blends, some over min-max normalized columns)
//! - categorical bucketing (fixed bin edges to ordered labels)
//! - ratio features (stabilized quotients)
//!
//! Every stage works on its own copy of the input table, only appends columns,
//! and silently skips a feature whose source columns are absent.

mod bucketing;
mod composite;
mod frame;
mod interactions;
mod ratios;

pub use bucketing::{BucketSpec, BucketingStage, OutOfRange};
pub use composite::{min_max_normalize, CompositeStage, DegenerateRange};
pub use frame::{has_column, is_numeric_dtype, missing_columns, numeric_values};
pub use interactions::{FeaturePair, PairwiseOp, PairwiseStage};
pub use ratios::ratio_pairs;

use crate::config::{FeatureConfig, DEFAULT_RATIO_STABILIZER};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Base audio fields the pipeline knows how to use
pub const AUDIO_FEATURES: [&str; 9] = [
    "acousticness",
    "danceability",
    "energy",
    "instrumentalness",
    "liveness",
    "loudness",
    "speechiness",
    "tempo",
    "valence",
];

/// Pipeline stage identity, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    Interactions,
    Composites,
    Categories,
    Ratios,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageKind::Interactions => "interactions",
            StageKind::Composites => "composites",
            StageKind::Categories => "categories",
            StageKind::Ratios => "ratios",
        };
        f.write_str(name)
    }
}

/// Why a feature was not created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// One or more source columns are absent
    MissingColumns(Vec<String>),
    /// The input already has a column with the output name
    AlreadyPresent,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingColumns(cols) => write!(f, "missing {}", cols.join(", ")),
            SkipReason::AlreadyPresent => f.write_str("already present"),
        }
    }
}

/// A feature a stage declined to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFeature {
    pub name: String,
    pub reason: SkipReason,
}

/// What one stage did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub kind: StageKind,
    /// Created columns, in creation order
    pub created: Vec<String>,
    pub skipped: Vec<SkippedFeature>,
}

impl StageReport {
    pub fn new(kind: StageKind) -> Self {
        Self {
            kind,
            created: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Table produced by a single stage plus its report
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub table: DataFrame,
    pub report: StageReport,
}

/// One additive pipeline stage
pub trait FeatureStage {
    /// Which stage this is
    fn kind(&self) -> StageKind;

    /// Build this stage's features from `df`, returning an extended copy
    fn apply(&self, df: &DataFrame) -> Result<StageOutput>;
}

/// Result of a full pipeline run
#[derive(Debug, Clone)]
pub struct EngineeredTable {
    pub table: DataFrame,
    /// Every created column, in creation order
    pub created: Vec<String>,
    /// Column count of the input table
    pub original_columns: usize,
    pub reports: Vec<StageReport>,
}

impl EngineeredTable {
    /// Number of columns added by the pipeline
    pub fn new_columns(&self) -> usize {
        self.created.len()
    }

    /// Column count of the engineered table
    pub fn total_columns(&self) -> usize {
        self.table.width()
    }

    /// Report for one stage
    pub fn report(&self, kind: StageKind) -> Option<&StageReport> {
        self.reports.iter().find(|r| r.kind == kind)
    }

    /// Consume into the engineered table
    pub fn into_table(self) -> DataFrame {
        self.table
    }
}

/// Feature engineering pipeline for song tables
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEngineer {
    ratio_stabilizer: f64,
    degenerate_range: DegenerateRange,
    out_of_range: OutOfRange,
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureEngineer {
    /// Create a pipeline with default policies
    pub fn new() -> Self {
        Self {
            ratio_stabilizer: DEFAULT_RATIO_STABILIZER,
            degenerate_range: DegenerateRange::default(),
            out_of_range: OutOfRange::default(),
        }
    }

    /// Take the pipeline policies from a config
    pub fn from_config(config: &FeatureConfig) -> Self {
        Self {
            ratio_stabilizer: config.ratio_stabilizer,
            degenerate_range: config.degenerate_range,
            out_of_range: config.out_of_range,
        }
    }

    /// Builder method to set the ratio stabilizer
    pub fn with_ratio_stabilizer(mut self, stabilizer: f64) -> Self {
        self.ratio_stabilizer = stabilizer;
        self
    }

    /// Builder method to set the degenerate range policy
    pub fn with_degenerate_range(mut self, policy: DegenerateRange) -> Self {
        self.degenerate_range = policy;
        self
    }

    /// Builder method to set the out-of-range bucketing policy
    pub fn with_out_of_range(mut self, policy: OutOfRange) -> Self {
        self.out_of_range = policy;
        self
    }

    /// Stages in execution order
    pub fn stages(&self) -> Vec<Box<dyn FeatureStage>> {
        vec![
            Box::new(PairwiseStage::interactions()),
            Box::new(CompositeStage::new(self.degenerate_range)),
            Box::new(BucketingStage::new(self.out_of_range)),
            Box::new(PairwiseStage::ratios(self.ratio_stabilizer)),
        ]
    }

    /// Products of the fixed audio feature pairs
    pub fn create_interaction_features(&self, df: &DataFrame) -> Result<StageOutput> {
        PairwiseStage::interactions().apply(df)
    }

    /// Happiness, dancefloor potential and chill factor
    pub fn create_composite_scores(&self, df: &DataFrame) -> Result<StageOutput> {
        CompositeStage::new(self.degenerate_range).apply(df)
    }

    /// Energy level, dance category, tempo category and mood labels
    pub fn create_categorical_features(&self, df: &DataFrame) -> Result<StageOutput> {
        BucketingStage::new(self.out_of_range).apply(df)
    }

    /// Speech-to-music and energy-to-acoustic ratios
    pub fn create_ratio_features(&self, df: &DataFrame) -> Result<StageOutput> {
        PairwiseStage::ratios(self.ratio_stabilizer).apply(df)
    }

    /// Run every stage in order. The caller's table is left untouched.
    pub fn create_all_features(&self, df: &DataFrame) -> Result<EngineeredTable> {
        let original_columns = df.width();
        info!(rows = df.height(), columns = original_columns, "starting feature engineering");

        let mut table = df.clone();
        let mut created = Vec::new();
        let mut reports = Vec::new();

        for stage in self.stages() {
            let output = stage.apply(&table)?;
            info!(
                stage = %output.report.kind,
                created = output.report.created.len(),
                skipped = output.report.skipped.len(),
                "stage complete"
            );
            created.extend(output.report.created.iter().cloned());
            reports.push(output.report);
            table = output.table;
        }

        info!(
            original = original_columns,
            new = created.len(),
            total = table.width(),
            "feature engineering complete"
        );

        Ok(EngineeredTable {
            table,
            created,
            original_columns,
            reports,
        })
    }
}
