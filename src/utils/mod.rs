//! Utility functions and types

pub mod data_loader;

pub use data_loader::{discover_input, resolve_input, DataLoader, DataSaver};
