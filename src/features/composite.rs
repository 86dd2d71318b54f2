//! Composite scores built from several audio features

use super::frame::{combine_rows, StageWriter};
use super::{FeatureStage, StageKind, StageOutput};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// How min-max normalization treats a column whose max equals its min
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegenerateRange {
    /// Every non-null value normalizes to 0.0
    #[default]
    Zero,
    /// Every value normalizes to null, so dependent scores are null
    Null,
}

/// Min-max parameters over the non-null, non-NaN values
#[derive(Debug, Clone, Copy)]
struct MinMaxParams {
    min: f64,
    range: f64,
}

impl MinMaxParams {
    fn fit(values: &[Option<f64>]) -> Option<Self> {
        let (min, max) = values
            .iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        if min > max {
            return None;
        }
        Some(Self {
            min,
            range: max - min,
        })
    }
}

/// Rescale a column to [0, 1] via `(x - min) / (max - min)`.
///
/// A zero range (including a column with no usable values) follows `policy`.
pub fn min_max_normalize(values: &[Option<f64>], policy: DegenerateRange) -> Vec<Option<f64>> {
    match MinMaxParams::fit(values) {
        Some(params) if params.range > 0.0 => values
            .iter()
            .map(|v| v.map(|x| (x - params.min) / params.range))
            .collect(),
        _ => match policy {
            DegenerateRange::Zero => values.iter().map(|v| v.map(|_| 0.0)).collect(),
            DegenerateRange::Null => vec![None; values.len()],
        },
    }
}

/// Happiness score, dancefloor potential and chill factor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeStage {
    degenerate_range: DegenerateRange,
}

impl CompositeStage {
    pub fn new(degenerate_range: DegenerateRange) -> Self {
        Self { degenerate_range }
    }
}

impl FeatureStage for CompositeStage {
    fn kind(&self) -> StageKind {
        StageKind::Composites
    }

    fn apply(&self, df: &DataFrame) -> Result<StageOutput> {
        let mut writer = StageWriter::new(self.kind(), df);

        // (valence + danceability - acousticness) / 2
        if let Some(cols) =
            writer.sources("happiness_score", &["valence", "danceability", "acousticness"])?
        {
            let values = combine_rows(&cols, |r| (r[0] + r[1] - r[2]) / 2.0);
            writer.push_numeric("happiness_score", values)?;
        }

        // (danceability + energy + tempo_norm) / 3
        if let Some(mut cols) =
            writer.sources("dancefloor_potential", &["danceability", "energy", "tempo"])?
        {
            cols[2] = min_max_normalize(&cols[2], self.degenerate_range);
            let values = combine_rows(&cols, |r| (r[0] + r[1] + r[2]) / 3.0);
            writer.push_numeric("dancefloor_potential", values)?;
        }

        // (acousticness + (1 - energy) + (1 - loudness_norm)) / 3
        if let Some(mut cols) =
            writer.sources("chill_factor", &["acousticness", "energy", "loudness"])?
        {
            cols[2] = min_max_normalize(&cols[2], self.degenerate_range);
            let values = combine_rows(&cols, |r| (r[0] + (1.0 - r[1]) + (1.0 - r[2])) / 3.0);
            writer.push_numeric("chill_factor", values)?;
        }

        Ok(writer.finish())
    }
}
