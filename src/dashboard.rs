//! Dashboard views over the startup resources
//!
//! Every view writes to the given output and reports dashboard errors there
//! instead of returning them, so a failed interaction never ends the
//! process. Only output IO errors propagate.

use crate::config::{clamp_rows, DashboardConfig};
use crate::data::{clean_for_display, describe_features, load_dataset};
use crate::error::DashboardError;
use crate::features::{FeatureRecord, FEATURES};
use crate::model::{predict_one, KMeansPipeline};
use crate::output::{
    print_error, print_info, print_success, print_warning, render_segment, render_summaries,
    render_table, title_case, OutputFormat,
};
use crate::projection::{DisplayTable, EXPORT_MIME};
use crate::segment::{describe, Segment};
use crate::session::Session;
use crate::viz::generate_eda_report;
use polars::prelude::DataFrame;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Rows shown when previewing an uploaded file
const UPLOAD_PREVIEW_ROWS: usize = 5;

/// Resources loaded once at startup plus the config they came from
pub struct Dashboard {
    pub config: DashboardConfig,
    dataset: Option<DataFrame>,
    pipeline: Option<KMeansPipeline>,
}

impl Dashboard {
    /// Load the dataset and model; a missing resource is logged, not fatal
    pub fn load(config: DashboardConfig) -> Self {
        let dataset = load_dataset(&config.data_path)
            .map_err(|e| warn!(path = %config.data_path.display(), error = %format!("{:#}", e), "Dataset unavailable"))
            .ok();
        let pipeline = KMeansPipeline::load(&config.model_path)
            .map_err(|e| warn!(path = %config.model_path.display(), error = %format!("{:#}", e), "Model unavailable"))
            .ok();

        Self::with_resources(config, dataset, pipeline)
    }

    pub fn with_resources(
        config: DashboardConfig,
        dataset: Option<DataFrame>,
        pipeline: Option<KMeansPipeline>,
    ) -> Self {
        Self {
            config,
            dataset,
            pipeline,
        }
    }

    fn dataset(&self) -> Result<&DataFrame, DashboardError> {
        self.dataset
            .as_ref()
            .ok_or_else(|| DashboardError::MissingResource {
                resource: "dataset",
                path: self.config.data_path.display().to_string(),
            })
    }

    fn pipeline(&self) -> Result<&KMeansPipeline, DashboardError> {
        self.pipeline
            .as_ref()
            .ok_or_else(|| DashboardError::MissingResource {
                resource: "model pipeline",
                path: self.config.model_path.display().to_string(),
            })
    }

    /// Warn about any resource that failed to load
    pub fn startup_warnings(&self, out: &mut dyn Write) -> crate::Result<()> {
        if self.dataset.is_none() || self.pipeline.is_none() {
            print_warning(
                out,
                "Make sure the dataset and model files are available; some views are disabled.",
            )?;
        }
        Ok(())
    }

    pub fn home(&self, out: &mut dyn Write) -> crate::Result<()> {
        writeln!(out, "Customer Segmentation Dashboard")?;
        writeln!(out, "===============================\n")?;
        writeln!(
            out,
            "This dashboard helps tackle low repeat-purchase and retention rates on the Olist \
             e-commerce platform using K-Means clustering. Customers are mapped by their RFM \
             metrics (Recency, Frequency, Monetary) together with Payment Installments, Price \
             and Review Score."
        )?;
        Ok(())
    }

    /// First `rows` dataset rows with cleaned, title-cased headers
    pub fn preview(&self, out: &mut dyn Write, rows: usize) -> crate::Result<()> {
        let dataset = match self.dataset() {
            Ok(dataset) => dataset,
            Err(e) => return report(out, &e),
        };

        let rows = clamp_rows(rows);
        writeln!(out, "Data Preview ({} rows)", rows)?;
        write_frame(out, dataset, rows)?;
        Ok(())
    }

    /// Descriptive statistics of the model features
    pub fn statistics(&self, out: &mut dyn Write) -> crate::Result<()> {
        let dataset = match self.dataset() {
            Ok(dataset) => dataset,
            Err(e) => return report(out, &e),
        };

        match describe_features(dataset, &FEATURES) {
            Ok(summaries) => {
                writeln!(out, "Descriptive Statistics")?;
                writeln!(out, "{}", render_summaries(&summaries))?;
            }
            Err(e) => print_error(out, &format!("{:#}", e))?,
        }
        Ok(())
    }

    /// Render the EDA charts into `out_dir`
    pub fn eda(&self, out: &mut dyn Write, feature: &str, out_dir: &Path) -> crate::Result<()> {
        let dataset = match self.dataset() {
            Ok(dataset) => dataset,
            Err(e) => return report(out, &e),
        };
        if !FEATURES.contains(&feature) {
            print_error(
                out,
                &format!("Unknown feature '{}', choose one of: {}", feature, FEATURES.join(", ")),
            )?;
            return Ok(());
        }

        match generate_eda_report(dataset, feature, out_dir) {
            Ok(paths) => {
                for path in paths {
                    print_success(out, &format!("Chart saved to {}", path.display()))?;
                }
            }
            Err(e) => print_error(out, &format!("Failed to render charts: {:#}", e))?,
        }
        Ok(())
    }

    /// Validate, predict and describe one manually entered customer
    pub fn predict_manual(
        &self,
        out: &mut dyn Write,
        record: &FeatureRecord,
        format: OutputFormat,
    ) -> crate::Result<()> {
        let errors = record.validate();
        if !errors.is_empty() {
            for message in &errors {
                print_error(out, message)?;
            }
            return Ok(());
        }

        let cluster = match self.pipeline().and_then(|p| predict_one(p, record)) {
            Ok(cluster) => cluster,
            Err(e) => return report(out, &e),
        };
        let segment = describe(cluster);

        match format {
            OutputFormat::Table => write!(out, "{}", render_segment(cluster, &segment))?,
            OutputFormat::Json => {
                let profile = match segment {
                    Segment::Known(profile) => serde_json::to_value(profile)?,
                    Segment::Unknown(_) => serde_json::Value::Null,
                };
                let body = json!({
                    "input": record,
                    "cluster": cluster,
                    "segment": segment.name(),
                    "profile": profile,
                });
                writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
            }
        }
        Ok(())
    }

    /// Upload a CSV into the session and preview it
    pub fn upload(&self, session: &mut Session, out: &mut dyn Write, path: &Path) -> crate::Result<()> {
        let upload = match session.upload_file(path) {
            Ok(upload) => upload,
            Err(e) => return report(out, &e),
        };

        writeln!(
            out,
            "Preview of {} (first {} rows)",
            upload.name, UPLOAD_PREVIEW_ROWS
        )?;
        writeln!(
            out,
            "Rows: {} | Cols: {}",
            upload.batch.height(),
            upload.batch.width()
        )?;
        write_frame(out, &upload.batch, UPLOAD_PREVIEW_ROWS)?;

        let missing = crate::data::check_schema(&upload.batch, &FEATURES);
        if !missing.is_empty() {
            report(out, &DashboardError::Schema(missing))?;
        }
        Ok(())
    }

    /// Run the batch prediction on the uploaded file
    pub fn run_prediction(&self, session: &mut Session, out: &mut dyn Write) -> crate::Result<()> {
        let pipeline = match self.pipeline() {
            Ok(pipeline) => pipeline,
            Err(e) => return report(out, &e),
        };

        match session.run_prediction(pipeline) {
            Ok(results) => print_success(
                out,
                &format!("Prediction finished for {} rows", results.height()),
            )?,
            Err(e) => report(out, &e)?,
        }
        Ok(())
    }

    /// Show the first `rows` projected results
    pub fn show_results(&self, session: &Session, out: &mut dyn Write, rows: usize) -> crate::Result<()> {
        match session.result_table() {
            Ok(table) => {
                writeln!(out, "Prediction Results")?;
                writeln!(out, "{}", render_table(&table.head(clamp_rows(rows))))?;
            }
            Err(e) => report(out, &e)?,
        }
        Ok(())
    }

    /// Write projected results as CSV
    pub fn export(&self, session: &Session, out: &mut dyn Write, path: Option<&Path>) -> crate::Result<()> {
        let target = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.export_file.clone().into());

        let bytes = match session.export() {
            Ok(bytes) => bytes,
            Err(e) => {
                print_error(out, &format!("{:#}", e))?;
                return Ok(());
            }
        };

        match std::fs::write(&target, &bytes) {
            Ok(()) => print_success(
                out,
                &format!(
                    "Results exported to {} ({} bytes, {})",
                    target.display(),
                    bytes.len(),
                    EXPORT_MIME
                ),
            )?,
            Err(e) => print_error(out, &format!("Failed to write {}: {}", target.display(), e))?,
        }
        Ok(())
    }
}

/// Print a dashboard error as the user sees it
fn report(out: &mut dyn Write, error: &DashboardError) -> crate::Result<()> {
    match error {
        DashboardError::MissingResource { .. } => print_warning(out, &error.to_string())?,
        DashboardError::NoUpload | DashboardError::NoResults => print_info(out, &error.to_string())?,
        DashboardError::Schema(missing) => {
            let names: Vec<String> = missing.iter().map(|m| title_case(m)).collect();
            print_error(out, &format!("File is missing columns: {}", names.join(", ")))?
        }
        _ => print_error(out, &error.to_string())?,
    }
    Ok(())
}

/// Render a raw frame with cleaned rows/columns and title-cased headers
/// Clean the whole frame first so dropped empty rows do not shorten the head
fn write_frame(out: &mut dyn Write, frame: &DataFrame, rows: usize) -> crate::Result<()> {
    let cleaned = clean_for_display(frame)?.head(Some(rows));
    let mut table = DisplayTable::from_frame(&cleaned)?;
    table.headers = table.headers.iter().map(|h| title_case(h)).collect();
    writeln!(out, "{}", render_table(&table))?;
    Ok(())
}
