//! Column access and the copy-on-write stage writer

use super::{SkipReason, SkippedFeature, StageKind, StageOutput, StageReport};
use crate::error::{FeatureError, Result};
use polars::prelude::*;
use tracing::debug;

/// Whether a dtype can be read as `f64`
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check whether a column exists
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Names from `required` that are not columns of `df`, in the given order
pub fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|name| !has_column(df, name))
        .map(|name| name.to_string())
        .collect()
}

/// Whether a column holds no values at all, whatever dtype the reader gave it.
///
/// A CSV column with every cell blank comes back as `String` (or `Null`).
fn is_all_null(column: &Column) -> bool {
    match column.dtype() {
        DataType::Null => true,
        DataType::String => column.null_count() == column.len(),
        _ => false,
    }
}

/// Read a column as `f64` values.
///
/// Returns `Ok(None)` when the column is absent and `MalformedInput` when it
/// exists but holds non-numeric data. An entirely blank column reads as all
/// nulls.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<f64>>>> {
    let column = match df.column(name) {
        Ok(column) => column,
        Err(_) => return Ok(None),
    };

    if is_all_null(column) {
        debug!(column = name, "blank column read as nulls");
        return Ok(Some(vec![None; column.len()]));
    }

    if !is_numeric_dtype(column.dtype()) {
        return Err(FeatureError::MalformedInput(format!(
            "column '{}' has non-numeric type {}",
            name,
            column.dtype()
        )));
    }

    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().collect();
    Ok(Some(values))
}

/// Accumulates the new columns of one stage on a private copy of its input.
///
/// Sources are always read from the stage input, so a stage never sees its
/// own outputs.
pub(crate) struct StageWriter<'a> {
    input: &'a DataFrame,
    table: DataFrame,
    report: StageReport,
}

impl<'a> StageWriter<'a> {
    pub(crate) fn new(kind: StageKind, input: &'a DataFrame) -> Self {
        Self {
            input,
            table: input.clone(),
            report: StageReport::new(kind),
        }
    }

    /// Fetch the source columns for `output`.
    ///
    /// Records a skip and returns `None` if a source is missing or `output`
    /// already exists.
    pub(crate) fn sources(
        &mut self,
        output: &str,
        names: &[&str],
    ) -> Result<Option<Vec<Vec<Option<f64>>>>> {
        if has_column(self.input, output) {
            self.skip(output, SkipReason::AlreadyPresent);
            return Ok(None);
        }

        let missing = missing_columns(self.input, names);
        if !missing.is_empty() {
            self.skip(output, SkipReason::MissingColumns(missing));
            return Ok(None);
        }

        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            if let Some(values) = numeric_values(self.input, name)? {
                columns.push(values);
            }
        }
        Ok(Some(columns))
    }

    /// Append a numeric feature
    pub(crate) fn push_numeric(&mut self, output: &str, values: Vec<Option<f64>>) -> Result<()> {
        self.table.with_column(Series::new(output.into(), values))?;
        self.record(output);
        Ok(())
    }

    /// Append a categorical feature holding label text
    pub(crate) fn push_labels(&mut self, output: &str, labels: Vec<Option<&str>>) -> Result<()> {
        self.table.with_column(Series::new(output.into(), labels))?;
        self.record(output);
        Ok(())
    }

    pub(crate) fn finish(self) -> StageOutput {
        StageOutput {
            table: self.table,
            report: self.report,
        }
    }

    fn record(&mut self, output: &str) {
        debug!(stage = %self.report.kind, feature = output, "created feature");
        self.report.created.push(output.to_string());
    }

    fn skip(&mut self, output: &str, reason: SkipReason) {
        debug!(stage = %self.report.kind, feature = output, reason = %reason, "skipped feature");
        self.report.skipped.push(SkippedFeature {
            name: output.to_string(),
            reason,
        });
    }
}

/// Combine equally long columns row by row; a null in any input gives null
pub(crate) fn combine_rows<F>(columns: &[Vec<Option<f64>>], f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
    let mut row = Vec::with_capacity(columns.len());

    (0..n_rows)
        .map(|i| {
            row.clear();
            for column in columns {
                row.push(column[i]?);
            }
            Some(f(&row))
        })
        .collect()
}
