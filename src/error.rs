//! User-facing error taxonomy for dashboard interactions

use thiserror::Error;

/// Errors reported back to the user after an interaction.
///
/// None of these are fatal: the dashboard prints them and waits for the next
/// command.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DashboardError {
    /// Manual input outside the feature domain, one message per violation
    #[error("invalid input: {}", .0.join(" "))]
    Validation(Vec<String>),

    /// Uploaded batch lacks required feature columns
    #[error("file is missing required columns: {}", .0.join(", "))]
    Schema(Vec<String>),

    /// Uploaded file could not be read as CSV
    #[error("failed to read CSV file: {0}")]
    Parse(String),

    /// The clustering pipeline rejected the input or failed internally
    #[error("prediction failed: {0}")]
    ModelInvocation(String),

    /// Dataset or model artifact was not available at startup
    #[error("{resource} is not available (expected at {path})")]
    MissingResource { resource: &'static str, path: String },

    #[error("no file has been uploaded yet")]
    NoUpload,

    #[error("no prediction results yet, run a prediction first")]
    NoResults,
}

impl DashboardError {
    pub fn model<E: std::fmt::Display>(cause: E) -> Self {
        DashboardError::ModelInvocation(cause.to_string())
    }
}
