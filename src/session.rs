//! Per-session interaction state
//!
//! Holds the current view, the last uploaded batch and the last prediction
//! results. Interactions run one at a time, so the session is owned by the
//! interaction loop and mutated in place.

use crate::data::{feature_matrix, read_upload};
use crate::error::DashboardError;
use crate::features::row_in_domain;
use crate::model::{predict_batch, ClusterPipeline};
use crate::projection::{project, to_exportable_bytes, DisplayTable, COLUMN_LABELS};
use polars::prelude::DataFrame;
use std::path::Path;
use tracing::{debug, info, warn};

/// Dashboard page selected in the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Preview,
    Eda,
    Predict,
}

impl View {
    pub fn label(&self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Preview => "Data Preview & Statistics",
            View::Eda => "Exploratory Data Analysis",
            View::Predict => "Cluster Prediction",
        }
    }
}

/// An uploaded file and its parsed rows
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub batch: DataFrame,
}

#[derive(Debug, Default)]
pub struct Session {
    view: View,
    upload: Option<Upload>,
    results: Option<DataFrame>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn upload(&self) -> Option<&Upload> {
        self.upload.as_ref()
    }

    pub fn results(&self) -> Option<&DataFrame> {
        self.results.as_ref()
    }

    /// Drop cached prediction results
    pub fn reset(&mut self) {
        if self.results.take().is_some() {
            debug!("Cached prediction results cleared");
        }
    }

    /// Forget the uploaded file along with any results derived from it
    pub fn clear_upload(&mut self) {
        self.upload = None;
        self.reset();
    }

    /// Parse and remember an uploaded file.
    ///
    /// A parse failure leaves the session untouched. A file whose name
    /// differs from the previous upload invalidates cached results before the
    /// new rows are stored.
    pub fn upload_file(&mut self, path: &Path) -> Result<&Upload, DashboardError> {
        let batch = read_upload(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.accept_upload(name, batch))
    }

    /// Store an already parsed batch under `name`
    pub fn accept_upload(&mut self, name: String, batch: DataFrame) -> &Upload {
        let is_new = self
            .upload
            .as_ref()
            .map_or(true, |previous| previous.name != name);
        if is_new {
            self.reset();
        }

        info!(file = %name, rows = batch.height(), columns = batch.width(), "File uploaded");
        self.upload.insert(Upload { name, batch })
    }

    /// Run the batch prediction on the uploaded file and cache the result.
    ///
    /// On failure the previous cache is left as it was.
    pub fn run_prediction(
        &mut self,
        pipeline: &dyn ClusterPipeline,
    ) -> Result<&DataFrame, DashboardError> {
        let upload = self.upload.as_ref().ok_or(DashboardError::NoUpload)?;
        let results = predict_batch(pipeline, &upload.batch)?;

        let out_of_range = count_out_of_range(&upload.batch);
        if out_of_range > 0 {
            warn!(
                file = %upload.name,
                rows = out_of_range,
                "Uploaded rows outside the manual-input domain were predicted as-is"
            );
        }

        Ok(self.results.insert(results))
    }

    /// Projected view of the cached results
    pub fn result_table(&self) -> Result<DisplayTable, DashboardError> {
        let results = self.results.as_ref().ok_or(DashboardError::NoResults)?;
        project(results, COLUMN_LABELS).map_err(|e| DashboardError::model(format!("{:#}", e)))
    }

    /// CSV bytes of the projected results
    pub fn export(&self) -> crate::Result<Vec<u8>> {
        let table = self.result_table()?;
        to_exportable_bytes(&table)
    }
}

/// Rows of a batch that would fail manual-input validation
pub fn count_out_of_range(batch: &DataFrame) -> usize {
    let Ok(matrix) = feature_matrix(batch) else {
        return 0;
    };

    matrix
        .outer_iter()
        .filter(|row| !row_in_domain(&row.to_vec()))
        .count()
}
