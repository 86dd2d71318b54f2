//! Pipeline configuration

use crate::error::{FeatureError, Result};
use crate::features::{DegenerateRange, OutOfRange};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default additive stabilizer for ratio denominators
pub const DEFAULT_RATIO_STABILIZER: f64 = 0.001;

/// Default number of features reported by the importance preview
pub const DEFAULT_TOP_K: usize = 10;

/// Configuration for a feature engineering run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Explicit input table; takes precedence over `input_candidates`
    pub data_path: Option<PathBuf>,

    /// Ordered fallback list searched when no explicit input is given
    pub input_candidates: Vec<PathBuf>,

    /// Where the engineered table is written
    pub output_path: PathBuf,

    /// Binary label column used by the importance preview
    pub target_column: String,

    /// Number of ranked features kept by the importance preview
    pub top_k: usize,

    /// Added to ratio denominators
    pub ratio_stabilizer: f64,

    /// Min-max normalization of a zero-range column
    pub degenerate_range: DegenerateRange,

    /// Bucketing of values outside the bin edges
    pub out_of_range: OutOfRange,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            input_candidates: vec![
                PathBuf::from("data/processed/spotify_clean.csv"),
                PathBuf::from("data/raw/Spotify_Data.csv"),
                PathBuf::from("data/raw/spotify_songs.csv"),
            ],
            output_path: PathBuf::from("data/processed/spotify_features_engineered.csv"),
            target_column: "target".to_string(),
            top_k: DEFAULT_TOP_K,
            ratio_stabilizer: DEFAULT_RATIO_STABILIZER,
            degenerate_range: DegenerateRange::default(),
            out_of_range: OutOfRange::default(),
        }
    }
}

impl FeatureConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document; missing keys fall back to defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML config file such as `config/data_config.yaml`
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            FeatureError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Builder method to set the explicit input path
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    /// Builder method to replace the fallback candidates
    pub fn with_input_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.input_candidates = candidates;
        self
    }

    /// Builder method to set the output path
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Builder method to set the target column
    pub fn with_target_column(mut self, name: impl Into<String>) -> Self {
        self.target_column = name.into();
        self
    }

    /// Builder method to set the preview size
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
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

    /// Reject values that would make the pipeline produce nonsense
    pub fn validate(&self) -> Result<()> {
        if !self.ratio_stabilizer.is_finite() || self.ratio_stabilizer <= 0.0 {
            return Err(FeatureError::InvalidParameter {
                name: "ratio_stabilizer".to_string(),
                value: self.ratio_stabilizer.to_string(),
                reason: "must be a positive finite number".to_string(),
            });
        }
        if self.top_k == 0 {
            return Err(FeatureError::InvalidParameter {
                name: "top_k".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.target_column.trim().is_empty() {
            return Err(FeatureError::InvalidParameter {
                name: "target_column".to_string(),
                value: String::new(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
