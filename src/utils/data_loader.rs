//! Song table loading and saving

use crate::config::FeatureConfig;
use crate::error::{FeatureError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// CSV loader for song tables
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows used for dtype inference
    infer_schema_length: Option<usize>,
    separator: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(1000),
            separator: b',',
        }
    }

    /// Set the number of rows scanned for dtype inference (`None` = all)
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Set the field separator
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Load a CSV file with a header row.
    ///
    /// A missing file is `InputUnavailable`; anything polars cannot parse is
    /// `MalformedInput`.
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(FeatureError::InputUnavailable {
                path: path.to_path_buf(),
            });
        }

        let parse_opts = CsvParseOptions::default().with_separator(self.separator);
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|e| FeatureError::MalformedInput(format!("{}: {}", path.display(), e)))?;

        if df.width() == 0 {
            return Err(FeatureError::MalformedInput(format!(
                "{}: no columns",
                path.display()
            )));
        }

        info!(path = %path.display(), rows = df.height(), columns = df.width(), "loaded table");
        Ok(df)
    }

    /// Detect the separator from the extension and load
    pub fn load_auto(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let is_tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("tsv"))
            .unwrap_or(false);

        if is_tsv {
            self.clone().with_separator(b'\t').load_csv(path)
        } else {
            self.load_csv(path)
        }
    }
}

/// First existing file among `candidates`, in order
pub fn discover_input(candidates: &[PathBuf]) -> Result<PathBuf> {
    for candidate in candidates {
        if candidate.is_file() {
            debug!(path = %candidate.display(), "found input");
            return Ok(candidate.clone());
        }
    }

    warn!(tried = ?candidates, "no input table found");
    Err(FeatureError::InputUnavailable {
        path: candidates.first().cloned().unwrap_or_default(),
    })
}

/// Pick the input table: explicit path, then configured path, then discovery
pub fn resolve_input(config: &FeatureConfig, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = &config.data_path {
        return Ok(path.clone());
    }
    discover_input(&config.input_candidates)
}

/// Save song tables
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV, creating parent directories as needed.
    ///
    /// The table is written to a sibling `.tmp` file and renamed over `path`,
    /// so a failed write leaves no partial output behind.
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file_name = path.file_name().ok_or_else(|| FeatureError::InvalidParameter {
            name: "path".to_string(),
            value: path.display().to_string(),
            reason: "must name a file".to_string(),
        })?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = path.with_file_name(tmp_name);

        let written = File::create(&tmp_path)
            .map_err(FeatureError::from)
            .and_then(|mut file| -> Result<()> {
                CsvWriter::new(&mut file).include_header(true).finish(df)?;
                file.sync_all()?;
                Ok(())
            })
            .and_then(|()| std::fs::rename(&tmp_path, path).map_err(FeatureError::from));

        if let Err(err) = written {
            if let Err(cleanup) = std::fs::remove_file(&tmp_path) {
                debug!(path = %tmp_path.display(), error = %cleanup, "temporary file not removed");
            }
            return Err(err);
        }

        info!(path = %path.display(), rows = df.height(), columns = df.width(), "saved table");
        Ok(())
    }

    /// Render as CSV bytes
    pub fn to_csv_bytes(df: &mut DataFrame) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        CsvWriter::new(&mut buf).include_header(true).finish(df)?;
        Ok(buf)
    }
}
