//! Rule-based hit score
//!
//! The quick heuristic used by the interactive demo before any model exists:
//! the mean of danceability, energy and valence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores above this are called potential hits
pub const HIT_THRESHOLD: f64 = 0.6;

/// Outcome of the heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    PotentialHit,
    NeedsWork,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::PotentialHit => f.write_str("potential hit"),
            Verdict::NeedsWork => f.write_str("needs work"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitScore {
    pub score: f64,
    pub verdict: Verdict,
}

/// Score a song from slider-style inputs; each input is clamped to [0, 1]
pub fn hit_score(danceability: f64, energy: f64, valence: f64) -> HitScore {
    let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
    let score = (clamp(danceability) + clamp(energy) + clamp(valence)) / 3.0;
    let verdict = if score > HIT_THRESHOLD {
        Verdict::PotentialHit
    } else {
        Verdict::NeedsWork
    };
    HitScore { score, verdict }
}
