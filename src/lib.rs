//! SegmentForge: a customer segmentation dashboard for the terminal
//!
//! Explores a fixed customer dataset and assigns customers to behavioural
//! segments with a pre-trained RFM K-Means pipeline. Input comes from manual
//! entry or CSV upload; results can be exported as CSV.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod features;
pub mod model;
pub mod output;
pub mod projection;
pub mod segment;
pub mod session;
pub mod shell;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use data::{check_schema, load_dataset, read_upload};
pub use error::DashboardError;
pub use features::{validate, FeatureRecord, FEATURES};
pub use model::{predict_batch, predict_one, ClusterId, ClusterPipeline, KMeansPipeline};
pub use projection::{project, to_exportable_bytes, DisplayTable, COLUMN_LABELS};
pub use segment::{describe, Segment, SegmentProfile};
pub use session::Session;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
