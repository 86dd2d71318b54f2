//! Pairwise feature generation: interaction products and stabilized ratios

use super::frame::{combine_rows, StageWriter};
use super::{FeatureStage, StageKind, StageOutput};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Operation combining two source columns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PairwiseOp {
    /// Multiplication: a * b
    Multiply,
    /// Division with an additive stabilizer: a / (b + stabilizer)
    StabilizedRatio { stabilizer: f64 },
}

impl PairwiseOp {
    /// Apply the operation
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            PairwiseOp::Multiply => a * b,
            PairwiseOp::StabilizedRatio { stabilizer } => a / (b + stabilizer),
        }
    }
}

/// Two source columns combined into one output column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePair {
    pub left: String,
    pub right: String,
    pub output: String,
    pub op: PairwiseOp,
}

impl FeaturePair {
    pub fn new(left: &str, right: &str, output: &str, op: PairwiseOp) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
            output: output.to_string(),
            op,
        }
    }

    /// Shorthand for a product pair
    pub fn product(left: &str, right: &str, output: &str) -> Self {
        Self::new(left, right, output, PairwiseOp::Multiply)
    }
}

/// The five audio interactions that tend to separate hits from non-hits
pub fn interaction_pairs() -> Vec<FeaturePair> {
    vec![
        FeaturePair::product("energy", "danceability", "energy_dance"),
        FeaturePair::product("valence", "danceability", "happy_dance"),
        FeaturePair::product("energy", "loudness", "energy_loudness"),
        FeaturePair::product("acousticness", "energy", "acoustic_energy"),
        FeaturePair::product("danceability", "tempo", "dance_tempo"),
    ]
}

/// Stage producing one column per pair whose sources are both present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseStage {
    kind: StageKind,
    pairs: Vec<FeaturePair>,
}

impl PairwiseStage {
    /// Create a stage over arbitrary pairs
    pub fn new(kind: StageKind, pairs: Vec<FeaturePair>) -> Self {
        Self { kind, pairs }
    }

    /// Interaction products
    pub fn interactions() -> Self {
        Self::new(StageKind::Interactions, interaction_pairs())
    }

    /// Pairs handled by this stage, in output order
    pub fn pairs(&self) -> &[FeaturePair] {
        &self.pairs
    }
}

impl FeatureStage for PairwiseStage {
    fn kind(&self) -> StageKind {
        self.kind
    }

    fn apply(&self, df: &DataFrame) -> Result<StageOutput> {
        let mut writer = StageWriter::new(self.kind, df);

        for pair in &self.pairs {
            let sources = [pair.left.as_str(), pair.right.as_str()];
            if let Some(columns) = writer.sources(&pair.output, &sources)? {
                let op = pair.op;
                let values = combine_rows(&columns, |row| op.apply(row[0], row[1]));
                writer.push_numeric(&pair.output, values)?;
            }
        }

        Ok(writer.finish())
    }
}
