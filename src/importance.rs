//! Correlation-based feature importance preview
//!
//! Ranks numeric columns by the absolute Pearson correlation with a binary
//! target. This is a quick look at which features move with hit status, not a
//! model-based importance.

use crate::config::{FeatureConfig, DEFAULT_TOP_K};
use crate::error::{FeatureError, Result};
use crate::features::{has_column, is_numeric_dtype, numeric_values};
use ndarray::{Array1, ArrayView1};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Correlation of one feature with the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCorrelation {
    pub feature: String,
    /// Signed Pearson coefficient
    pub correlation: f64,
    /// |correlation|, the ranking key
    pub abs_correlation: f64,
}

/// Ranked correlations against a target column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceReport {
    pub target: String,
    /// Strongest first, at most `top_k` entries
    pub ranked: Vec<FeatureCorrelation>,
    /// Numeric columns considered, excluding the target
    pub n_candidates: usize,
}

impl ImportanceReport {
    /// Top ranked feature, if any
    pub fn strongest(&self) -> Option<&FeatureCorrelation> {
        self.ranked.first()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Importance preview against a target column
#[derive(Debug, Clone, PartialEq)]
pub struct ImportancePreview {
    target: String,
    top_k: usize,
}

impl Default for ImportancePreview {
    fn default() -> Self {
        Self::new("target")
    }
}

impl ImportancePreview {
    /// Preview against `target`, keeping the default ten features
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn from_config(config: &FeatureConfig) -> Self {
        Self::new(config.target_column.clone()).with_top_k(config.top_k)
    }

    /// Builder method to set how many features are kept
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Rank numeric columns of `df` by |r| with the target.
    ///
    /// Returns `Ok(None)` with a warning when the target column is absent.
    pub fn compute(&self, df: &DataFrame) -> Result<Option<ImportanceReport>> {
        if !has_column(df, &self.target) {
            warn!(target_column = %self.target, "no target column found, skipping importance preview");
            return Ok(None);
        }

        let target = numeric_values(df, &self.target)?.ok_or_else(|| {
            FeatureError::MalformedInput(format!("target column '{}' unreadable", self.target))
        })?;

        let mut n_candidates = 0;
        let mut ranked = Vec::new();

        for column in df.get_columns() {
            let name = column.name().as_str();
            if name == self.target || !is_numeric_dtype(column.dtype()) {
                continue;
            }
            n_candidates += 1;

            let Some(values) = numeric_values(df, name)? else {
                continue;
            };
            match pairwise_correlation(&values, &target) {
                Some(r) => ranked.push(FeatureCorrelation {
                    feature: name.to_string(),
                    correlation: r,
                    abs_correlation: r.abs(),
                }),
                None => debug!(feature = name, "correlation undefined, left out of ranking"),
            }
        }

        ranked.sort_by(|a, b| {
            b.abs_correlation
                .partial_cmp(&a.abs_correlation)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.feature.cmp(&b.feature))
        });
        ranked.truncate(self.top_k);

        Ok(Some(ImportanceReport {
            target: self.target.clone(),
            ranked,
            n_candidates,
        }))
    }
}

/// Pearson correlation over rows where both values are present and finite
pub fn pairwise_correlation(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((*a, *b)),
            _ => None,
        })
        .unzip();

    let xs = Array1::from_vec(xs);
    let ys = Array1::from_vec(ys);
    pearson_correlation(xs.view(), ys.view())
}

/// Pearson correlation; `None` for fewer than two points or zero variance
pub fn pearson_correlation(x: ArrayView1<f64>, y: ArrayView1<f64>) -> Option<f64> {
    if x.len() < 2 || x.len() != y.len() {
        return None;
    }

    let x_mean = x.mean()?;
    let y_mean = y.mean()?;

    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut sum_y2 = 0.0;

    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        sum_xy += dx * dy;
        sum_x2 += dx * dx;
        sum_y2 += dy * dy;
    }

    let denom = (sum_x2 * sum_y2).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        None
    } else {
        Some((sum_xy / denom).clamp(-1.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_pearson_perfect() {
        let x = array![1.0, 2.0, 3.0, 4.0];
        let y = array![2.0, 4.0, 6.0, 8.0];
        let r = pearson_correlation(x.view(), y.view()).unwrap();
        assert!((r - 1.0).abs() < 1e-12);

        let y = array![8.0, 6.0, 4.0, 2.0];
        let r = pearson_correlation(x.view(), y.view()).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined() {
        let x = array![1.0, 1.0, 1.0];
        let y = array![0.0, 1.0, 0.0];
        assert!(pearson_correlation(x.view(), y.view()).is_none());

        let x = array![1.0];
        assert!(pearson_correlation(x.view(), x.view()).is_none());
    }

    #[test]
    fn test_pairwise_skips_nulls() {
        let x = vec![Some(1.0), None, Some(2.0), Some(3.0), Some(f64::NAN)];
        let y = vec![Some(0.0), Some(1.0), Some(1.0), Some(2.0), Some(1.0)];
        let r = pairwise_correlation(&x, &y).unwrap();
        let expected = pearson_correlation(
            array![1.0, 2.0, 3.0].view(),
            array![0.0, 1.0, 2.0].view(),
        )
        .unwrap();
        assert!((r - expected).abs() < 1e-12);
    }

    #[test]
    fn test_preview_without_target() {
        let df = df!("energy" => &[0.1, 0.2]).unwrap();
        assert!(ImportancePreview::default().compute(&df).unwrap().is_none());
    }

    #[test]
    fn test_preview_ranks_and_truncates() {
        let df = df!(
            "target" => &[0, 1, 0, 1, 1, 0],
            "copy" => &[0.0, 1.0, 0.0, 1.0, 1.0, 0.0],
            "inverse" => &[0.9, 0.1, 0.8, 0.2, 0.3, 0.7],
            "noise" => &[0.5, 0.1, 0.2, 0.4, 0.3, 0.9],
            "constant" => &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            "label" => &["a", "b", "c", "d", "e", "f"]
        )
        .unwrap();

        let report = ImportancePreview::default().with_top_k(2).compute(&df).unwrap().unwrap();
        assert_eq!(report.n_candidates, 4);
        assert_eq!(report.ranked.len(), 2);
        assert_eq!(report.strongest().unwrap().feature, "copy");
        assert!((report.ranked[0].abs_correlation - 1.0).abs() < 1e-9);
        assert_eq!(report.ranked[1].feature, "inverse");
        assert!(report.ranked[1].correlation < 0.0);
    }

    #[test]
    fn test_non_numeric_target_is_malformed() {
        let df = df!(
            "target" => &["hit", "miss"],
            "energy" => &[0.1, 0.2]
        )
        .unwrap();
        let err = ImportancePreview::default().compute(&df).unwrap_err();
        assert!(matches!(err, FeatureError::MalformedInput(_)));
    }

    #[test]
    fn test_report_json() {
        let report = ImportanceReport {
            target: "target".into(),
            ranked: vec![FeatureCorrelation {
                feature: "energy".into(),
                correlation: -0.5,
                abs_correlation: 0.5,
            }],
            n_candidates: 1,
        };
        let json = report.to_json().unwrap();
        assert!(json.contains("\"abs_correlation\": 0.5"));
    }
}
