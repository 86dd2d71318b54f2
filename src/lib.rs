//! spotify-features - Feature engineering for song hit prediction
//!
//! This crate turns a table of per-song audio descriptors into a wider table
//! of derived signals ready for a downstream classifier:
//! - Interaction features between pairs of audio fields
//! - Composite mood/energy scores, partly over min-max normalized columns
//! - Categorical buckets over fixed bin edges
//! - Stabilized ratio features
//!
//! # Modules
//!
//! - [`features`] - The four feature stages and the pipeline that runs them
//! - [`importance`] - Correlation-based feature importance preview
//! - [`config`] - Pipeline configuration (YAML)
//! - [`utils`] - CSV loading, input discovery and saving
//! - [`synthetic`] - Seeded synthetic song tables
//! - [`scoring`] - Rule-based hit score
//! - [`cli`] - Command-line interface

pub mod error;

pub mod config;
pub mod features;
pub mod importance;

pub mod scoring;
pub mod synthetic;
pub mod utils;

pub mod cli;

pub use error::{FeatureError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::FeatureConfig;
    pub use crate::error::{FeatureError, Result};
    pub use crate::features::{
        BucketSpec, DegenerateRange, EngineeredTable, FeatureEngineer, FeatureStage, OutOfRange,
        StageKind, StageReport,
    };
    pub use crate::importance::{ImportancePreview, ImportanceReport};
    pub use crate::scoring::{hit_score, HitScore, Verdict};
    pub use crate::synthetic::SongGenerator;
    pub use crate::utils::{DataLoader, DataSaver};
}
