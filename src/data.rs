//! Data loading, schema checks and descriptive statistics using Polars

use crate::error::DashboardError;
use crate::features::{FEATURES, N_FEATURES};
use anyhow::Context;
use ndarray::Array2;
use polars::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Load the read-only customer dataset shown in the preview and EDA views
pub fn load_dataset(path: &Path) -> crate::Result<DataFrame> {
    if !path.exists() {
        anyhow::bail!("Dataset file not found: {}", path.display());
    }

    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(None)
        .finish()
        .with_context(|| format!("Failed to scan dataset {}", path.display()))?
        .collect()
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;

    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Dataset loaded"
    );
    Ok(df)
}

/// Parse an uploaded CSV file into a raw batch
pub fn read_upload(path: &Path) -> Result<DataFrame, DashboardError> {
    let bytes = std::fs::read(path)
        .map_err(|e| DashboardError::Parse(format!("{}: {}", path.display(), e)))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Upload read");
    read_csv_bytes(&bytes)
}

/// Parse CSV bytes into a raw batch.
///
/// Column types are inferred from every row, so a late decimal or an
/// alphanumeric id further down the file does not fail the parse.
pub fn read_csv_bytes(bytes: &[u8]) -> Result<DataFrame, DashboardError> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .map_err(|e| DashboardError::Parse(e.to_string()))
}

/// Required columns absent from `batch`, in the order given by `required`
pub fn check_schema(batch: &DataFrame, required: &[&str]) -> Vec<String> {
    let present = batch.get_column_names();
    required
        .iter()
        .filter(|name| !present.contains(name))
        .map(|name| name.to_string())
        .collect()
}

/// Extract the model input matrix (n_rows, 6) in `FEATURES` order.
///
/// Every cell must be numeric; a missing or unparseable value fails the
/// whole extraction.
pub fn feature_matrix(batch: &DataFrame) -> crate::Result<Array2<f64>> {
    let n_rows = batch.height();
    let columns = FEATURES
        .iter()
        .map(|name| required_numeric_column(batch, name))
        .collect::<crate::Result<Vec<_>>>()?;

    let mut data = Vec::with_capacity(n_rows * N_FEATURES);
    for row in 0..n_rows {
        for column in &columns {
            data.push(column[row]);
        }
    }

    Ok(Array2::from_shape_vec((n_rows, N_FEATURES), data)?)
}

fn required_numeric_column(frame: &DataFrame, name: &str) -> crate::Result<Vec<f64>> {
    let values = frame
        .column(name)?
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' is not numeric", name))?;

    values
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| {
                anyhow::anyhow!(
                    "Column '{}' has a missing or non-numeric value at row {}",
                    name,
                    row + 1
                )
            })
        })
        .collect()
}

/// Numeric values of a column, nulls and NaN skipped
pub fn numeric_values(frame: &DataFrame, name: &str) -> crate::Result<Vec<f64>> {
    let values = frame
        .column(name)?
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' is not numeric", name))?;

    Ok(values
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect())
}

/// Render every cell of a column as text; `None` marks a missing cell.
///
/// Non-finite floats count as missing.
pub fn cell_text(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    if series.dtype().is_float() {
        let values = series.cast(&DataType::Float64)?;
        return Ok(values
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()).map(|x| x.to_string()))
            .collect());
    }

    let values = series.cast(&DataType::String)?;
    Ok(values
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Drop columns and rows that are entirely null, as the preview shows them
pub fn clean_for_display(frame: &DataFrame) -> crate::Result<DataFrame> {
    let height = frame.height();
    let columns: Vec<Series> = frame
        .get_columns()
        .iter()
        .filter(|s| height == 0 || s.null_count() < s.len())
        .cloned()
        .collect();
    let kept = DataFrame::new(columns)?;

    let mut mask = BooleanChunked::full("non_empty", false, height);
    for series in kept.get_columns() {
        mask = &mask | &series.is_not_null();
    }

    Ok(kept.filter(&mask)?)
}

/// Descriptive statistics of one numeric feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSummary {
    pub feature: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl FeatureSummary {
    /// Summarize non-null values; statistics of an empty column are NaN
    pub fn from_values(feature: &str, values: &[f64]) -> Self {
        let count = values.len();
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = if count == 0 {
            f64::NAN
        } else {
            sorted.iter().sum::<f64>() / count as f64
        };
        let std = if count < 2 {
            f64::NAN
        } else {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        };

        Self {
            feature: feature.to_string(),
            count,
            mean,
            std,
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// Linear-interpolated quantile of already sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Descriptive statistics for each named feature column
pub fn describe_features(frame: &DataFrame, features: &[&str]) -> crate::Result<Vec<FeatureSummary>> {
    let missing = check_schema(frame, features);
    if !missing.is_empty() {
        anyhow::bail!("Dataset is missing feature columns: {}", missing.join(", "));
    }

    features
        .iter()
        .map(|name| {
            let values = numeric_values(frame, name)?;
            Ok(FeatureSummary::from_values(name, &values))
        })
        .collect()
}

/// Count occurrences of each value in a categorical column.
///
/// Returns `None` when the column does not exist. Nulls are not counted.
/// Sorted by descending count, ties broken by label so output is stable.
pub fn category_counts(
    frame: &DataFrame,
    column: &str,
    top: Option<usize>,
) -> crate::Result<Option<Vec<(String, usize)>>> {
    let series = match frame.column(column) {
        Ok(series) => series,
        Err(_) => {
            debug!(column, "Column not present, skipping counts");
            return Ok(None);
        }
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in cell_text(series)?.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    if let Some(top) = top {
        counts.truncate(top);
    }

    Ok(Some(counts))
}

/// One histogram bin, `[start, end)` except for the last which is closed
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram of `values`
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = finite.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max = finite.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let (start, end) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (end - start) / bins as f64;

    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: start + width * i as f64,
            end: start + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for value in finite {
        let idx = (((value - start) / width) as usize).min(bins - 1);
        result[idx].count += 1;
    }

    result
}
