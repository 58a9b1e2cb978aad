//! Dashboard configuration

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file read from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "segmentforge.toml";

/// Prefix of environment variable overrides, e.g. `SEGMENTFORGE_DATA_PATH`
pub const ENV_PREFIX: &str = "SEGMENTFORGE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardConfig {
    /// Customer dataset shown in the preview and EDA views
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Pre-trained pipeline artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// File name used when exporting results without an explicit path
    #[serde(default = "default_export_file")]
    pub export_file: String,

    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// Directory charts are rendered into
    #[serde(default = "default_chart_dir")]
    pub chart_dir: PathBuf,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("Olist_Dataset_Clustering.csv")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/rfm_kmeans_pipeline.json")
}

fn default_export_file() -> String {
    crate::projection::EXPORT_FILE_NAME.to_string()
}

fn default_preview_rows() -> usize {
    10
}

fn default_chart_dir() -> PathBuf {
    PathBuf::from("charts")
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            model_path: default_model_path(),
            export_file: default_export_file(),
            preview_rows: default_preview_rows(),
            chart_dir: default_chart_dir(),
        }
    }
}

impl DashboardConfig {
    /// Load from an optional TOML file, then environment overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file = config_file.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        let config = config::Config::builder()
            .add_source(config::File::from(file).required(config_file.is_some()))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// Clamp a requested row count to the 5..=100 range the views offer
pub fn clamp_rows(rows: usize) -> usize {
    rows.clamp(5, 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.export_file, "olist_cluster_results.csv");
        assert_eq!(config.preview_rows, 10);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "data_path = \"data/customers.csv\"").unwrap();
        writeln!(file, "preview_rows = 25").unwrap();

        let config = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.data_path, PathBuf::from("data/customers.csv"));
        assert_eq!(config.preview_rows, 25);
        assert_eq!(config.model_path, default_model_path());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(DashboardConfig::load(Some(Path::new("/no/such/segmentforge.toml"))).is_err());
    }

    #[test]
    fn test_clamp_rows() {
        assert_eq!(clamp_rows(1), 5);
        assert_eq!(clamp_rows(50), 50);
        assert_eq!(clamp_rows(1000), 100);
    }
}
