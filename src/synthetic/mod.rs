//! Synthetic data generation
//!
//! Seeded song tables for demos, tests and benchmarks when no real dataset
//! is at hand.

mod songs;

pub use songs::SongGenerator;
