//! Ratio features

use super::interactions::{FeaturePair, PairwiseOp, PairwiseStage};
use super::StageKind;

/// Speech-to-music and energy-to-acoustic ratios, each with `stabilizer`
/// added to the denominator
pub fn ratio_pairs(stabilizer: f64) -> Vec<FeaturePair> {
    let op = PairwiseOp::StabilizedRatio { stabilizer };
    vec![
        FeaturePair::new("speechiness", "instrumentalness", "speech_to_music_ratio", op),
        FeaturePair::new("energy", "acousticness", "energy_acoustic_ratio", op),
    ]
}

impl PairwiseStage {
    /// Stabilized ratio features
    pub fn ratios(stabilizer: f64) -> Self {
        Self::new(StageKind::Ratios, ratio_pairs(stabilizer))
    }
}
