//! Synthetic song tables with a derived hit label

use crate::error::{FeatureError, Result};
use polars::prelude::*;
use rand::prelude::*;
use rand_distr::{Beta, Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Generator of realistic-looking audio feature tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongGenerator {
    n_songs: usize,
    seed: Option<u64>,
    with_target: bool,
}

impl Default for SongGenerator {
    fn default() -> Self {
        Self::new(500)
    }
}

fn beta(a: f64, b: f64) -> Result<Beta<f64>> {
    Beta::new(a, b).map_err(|e| FeatureError::InvalidParameter {
        name: "beta".to_string(),
        value: format!("({}, {})", a, b),
        reason: e.to_string(),
    })
}

fn normal(mean: f64, std: f64) -> Result<Normal<f64>> {
    Normal::new(mean, std).map_err(|e| FeatureError::InvalidParameter {
        name: "normal".to_string(),
        value: format!("({}, {})", mean, std),
        reason: e.to_string(),
    })
}

fn sample_n<D: Distribution<f64>>(dist: &D, n: usize, rng: &mut StdRng) -> Vec<f64> {
    (0..n).map(|_| dist.sample(rng)).collect()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

impl SongGenerator {
    /// Create a generator for `n_songs` rows
    pub fn new(n_songs: usize) -> Self {
        Self {
            n_songs,
            seed: None,
            with_target: true,
        }
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Include or omit the `target` column
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Draw the table.
    ///
    /// The hit label favours energetic, danceable, happy, non-acoustic songs:
    /// a noisy weighted blend is thresholded at its median, so about half the
    /// rows are hits.
    pub fn generate(&self) -> Result<DataFrame> {
        if self.n_songs == 0 {
            return Err(FeatureError::InvalidParameter {
                name: "n_songs".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let n = self.n_songs;

        let (b25, b22, b110, b19) = (beta(2.0, 5.0)?, beta(2.0, 2.0)?, beta(1.0, 10.0)?, beta(1.0, 9.0)?);
        let loud = normal(-8.0, 4.0)?;
        let bpm = normal(120.0, 30.0)?;
        let noise = normal(0.0, 0.1)?;

        let acousticness = sample_n(&b25, n, &mut rng);
        let danceability = sample_n(&b22, n, &mut rng);
        let energy = sample_n(&b22, n, &mut rng);
        let instrumentalness = sample_n(&b110, n, &mut rng);
        let liveness = sample_n(&b19, n, &mut rng);
        let loudness = sample_n(&loud, n, &mut rng);
        let speechiness = sample_n(&b110, n, &mut rng);
        let tempo = sample_n(&bpm, n, &mut rng);
        let valence = sample_n(&b22, n, &mut rng);

        let mut columns = vec![
            Column::new("acousticness".into(), &acousticness),
            Column::new("danceability".into(), &danceability),
            Column::new("energy".into(), &energy),
            Column::new("instrumentalness".into(), &instrumentalness),
            Column::new("liveness".into(), &liveness),
            Column::new("loudness".into(), &loudness),
            Column::new("speechiness".into(), &speechiness),
            Column::new("tempo".into(), &tempo),
            Column::new("valence".into(), &valence),
        ];

        if self.with_target {
            let jitter = sample_n(&noise, n, &mut rng);
            let hit_probability: Vec<f64> = (0..n)
                .map(|i| {
                    let p = energy[i] * 0.3
                        + danceability[i] * 0.3
                        + valence[i] * 0.2
                        + (1.0 - acousticness[i]) * 0.2
                        + jitter[i];
                    p.clamp(0.0, 1.0)
                })
                .collect();
            let threshold = median(&hit_probability);
            let target: Vec<i64> = hit_probability
                .iter()
                .map(|&p| i64::from(p > threshold))
                .collect();
            columns.push(Column::new("target".into(), &target));
        }

        Ok(DataFrame::new(columns)?)
    }
}
