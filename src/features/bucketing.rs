//! Categorical bucketing of continuous audio features

use super::frame::StageWriter;
use super::{FeatureStage, StageKind, StageOutput};
use crate::error::{FeatureError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// How values outside the bin edges are labeled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfRange {
    /// No label (null)
    #[default]
    Null,
    /// Below the first edge takes the first label, above the last edge the last
    Clamp,
}

/// Fixed bin edges mapping one source column to ordered labels.
///
/// Bins are right-inclusive `(e[i], e[i+1]]`; the first bin also contains
/// its left edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSpec {
    pub source: String,
    pub output: String,
    pub edges: Vec<f64>,
    pub labels: Vec<String>,
}

impl BucketSpec {
    /// Create a bucketing rule; edges must be strictly increasing with one more edge
    /// than labels
    pub fn new(source: &str, output: &str, edges: Vec<f64>, labels: &[&str]) -> Result<Self> {
        if labels.is_empty() || edges.len() != labels.len() + 1 {
            return Err(FeatureError::InvalidParameter {
                name: "edges".to_string(),
                value: format!("{:?}", edges),
                reason: format!("expected {} edges for {} labels", labels.len() + 1, labels.len()),
            });
        }
        if edges.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(FeatureError::InvalidParameter {
                name: "edges".to_string(),
                value: format!("{:?}", edges),
                reason: "edges must be strictly increasing".to_string(),
            });
        }
        Ok(Self::fixed(source, output, edges, labels))
    }

    fn fixed(source: &str, output: &str, edges: Vec<f64>, labels: &[&str]) -> Self {
        Self {
            source: source.to_string(),
            output: output.to_string(),
            edges,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// energy → Low / Medium / High
    pub fn energy_level() -> Self {
        Self::fixed("energy", "energy_level", vec![0.0, 0.3, 0.7, 1.0], &["Low", "Medium", "High"])
    }

    /// danceability → Not_Danceable / Moderate / Very_Danceable
    pub fn dance_category() -> Self {
        Self::fixed(
            "danceability",
            "dance_category",
            vec![0.0, 0.4, 0.7, 1.0],
            &["Not_Danceable", "Moderate", "Very_Danceable"],
        )
    }

    /// tempo → Slow / Medium / Fast / Very_Fast
    pub fn tempo_category() -> Self {
        Self::fixed(
            "tempo",
            "tempo_category",
            vec![0.0, 90.0, 120.0, 140.0, 200.0],
            &["Slow", "Medium", "Fast", "Very_Fast"],
        )
    }

    /// valence → Sad / Neutral / Happy
    pub fn mood() -> Self {
        Self::fixed("valence", "mood", vec![0.0, 0.33, 0.67, 1.0], &["Sad", "Neutral", "Happy"])
    }

    /// Index of the bin holding `value`
    pub fn find_bin(&self, value: f64, policy: OutOfRange) -> Option<usize> {
        if value.is_nan() {
            return None;
        }

        let (Some(&first), Some(&last)) = (self.edges.first(), self.edges.last()) else {
            return None;
        };
        if value == first && !self.labels.is_empty() {
            return Some(0);
        }
        for (i, window) in self.edges.windows(2).enumerate() {
            if value > window[0] && value <= window[1] {
                return Some(i);
            }
        }

        match policy {
            OutOfRange::Null => None,
            OutOfRange::Clamp if value < first => Some(0),
            OutOfRange::Clamp if value > last => self.labels.len().checked_sub(1),
            OutOfRange::Clamp => None,
        }
    }

    /// Label for `value`
    pub fn label(&self, value: f64, policy: OutOfRange) -> Option<&str> {
        self.find_bin(value, policy)
            .and_then(|i| self.labels.get(i))
            .map(|l| l.as_str())
    }
}

/// Stage turning continuous features into ordered category labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketingStage {
    specs: Vec<BucketSpec>,
    out_of_range: OutOfRange,
}

impl BucketingStage {
    /// The four standard buckets
    pub fn new(out_of_range: OutOfRange) -> Self {
        Self::with_specs(
            vec![
                BucketSpec::energy_level(),
                BucketSpec::dance_category(),
                BucketSpec::tempo_category(),
                BucketSpec::mood(),
            ],
            out_of_range,
        )
    }

    /// Custom buckets
    pub fn with_specs(specs: Vec<BucketSpec>, out_of_range: OutOfRange) -> Self {
        Self { specs, out_of_range }
    }

    pub fn specs(&self) -> &[BucketSpec] {
        &self.specs
    }
}

impl FeatureStage for BucketingStage {
    fn kind(&self) -> StageKind {
        StageKind::Categories
    }

    fn apply(&self, df: &DataFrame) -> Result<StageOutput> {
        let mut writer = StageWriter::new(self.kind(), df);

        for spec in &self.specs {
            if let Some(cols) = writer.sources(&spec.output, &[spec.source.as_str()])? {
                let labels: Vec<Option<&str>> = cols[0]
                    .iter()
                    .map(|v| v.and_then(|x| spec.label(x, self.out_of_range)))
                    .collect();
                writer.push_labels(&spec.output, labels)?;
            }
        }

        Ok(writer.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_edges() {
        let spec = BucketSpec::energy_level();
        assert_eq!(spec.label(0.0, OutOfRange::Null), Some("Low"));
        assert_eq!(spec.label(0.3, OutOfRange::Null), Some("Low"));
        assert_eq!(spec.label(0.31, OutOfRange::Null), Some("Medium"));
        assert_eq!(spec.label(0.7, OutOfRange::Null), Some("Medium"));
        assert_eq!(spec.label(0.8, OutOfRange::Null), Some("High"));
        assert_eq!(spec.label(1.0, OutOfRange::Null), Some("High"));
    }

    #[test]
    fn test_tempo_out_of_range() {
        let spec = BucketSpec::tempo_category();
        assert_eq!(spec.label(205.0, OutOfRange::Null), None);
        assert_eq!(spec.label(205.0, OutOfRange::Clamp), Some("Very_Fast"));
        assert_eq!(spec.label(-1.0, OutOfRange::Clamp), Some("Slow"));
        assert_eq!(spec.label(f64::NAN, OutOfRange::Clamp), None);
        assert_eq!(spec.label(120.0, OutOfRange::Null), Some("Medium"));
        assert_eq!(spec.label(121.0, OutOfRange::Null), Some("Fast"));
    }

    #[test]
    fn test_spec_validation() {
        assert!(BucketSpec::new("x", "x_bin", vec![0.0, 1.0], &["a", "b"]).is_err());
        assert!(BucketSpec::new("x", "x_bin", vec![0.0, 0.0, 1.0], &["a", "b"]).is_err());
        assert!(BucketSpec::new("x", "x_bin", vec![0.0, 0.5, 1.0], &["a", "b"]).is_ok());
    }

    #[test]
    fn test_stage_labels() {
        let df = df!(
            "energy" => &[0.8, 0.1],
            "danceability" => &[0.6, 0.9],
            "tempo" => &[120.0, 250.0],
            "valence" => &[0.7, 0.33]
        )
        .unwrap();

        let output = BucketingStage::new(OutOfRange::Null).apply(&df).unwrap();
        assert_eq!(
            output.report.created,
            vec!["energy_level", "dance_category", "tempo_category", "mood"]
        );

        let labels = |name: &str| -> Vec<Option<String>> {
            output
                .table
                .column(name)
                .unwrap()
                .as_materialized_series()
                .str()
                .unwrap()
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        };
        assert_eq!(labels("energy_level"), vec![Some("High".to_string()), Some("Low".to_string())]);
        assert_eq!(
            labels("dance_category"),
            vec![Some("Moderate".to_string()), Some("Very_Danceable".to_string())]
        );
        assert_eq!(labels("tempo_category"), vec![Some("Medium".to_string()), None]);
        assert_eq!(labels("mood"), vec![Some("Happy".to_string()), Some("Sad".to_string())]);
    }

    #[test]
    fn test_stage_skips_absent_source() {
        let df = df!("energy" => &[0.5]).unwrap();
        let output = BucketingStage::new(OutOfRange::Clamp).apply(&df).unwrap();
        assert_eq!(output.report.created, vec!["energy_level".to_string()]);
        assert_eq!(output.report.skipped.len(), 3);
    }
}
