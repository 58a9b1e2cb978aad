//! Pre-trained clustering pipeline and prediction entry points
//!
//! The pipeline is an opaque, already-fitted artifact: a standard scaler
//! followed by K-Means centroids. Nothing here fits or updates it.

use crate::data::{check_schema, feature_matrix};
use crate::error::DashboardError;
use crate::features::{FeatureRecord, FEATURES, N_FEATURES};
use anyhow::Context;
use ndarray::{Array2, ArrayView1};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Cluster label assigned by the pipeline
pub type ClusterId = usize;

/// Name of the label column appended to predicted batches
pub const CLUSTER_COLUMN: &str = "cluster";

/// Anything that maps a feature matrix to one cluster id per row.
///
/// Columns are ordered as in `FEATURES`; output order matches row order.
pub trait ClusterPipeline {
    fn predict(&self, features: &Array2<f64>) -> crate::Result<Vec<ClusterId>>;
}

/// Fitted standard scaler parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// K-Means pipeline loaded from a JSON artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansPipeline {
    /// Artifact version tag, for logs only
    #[serde(default)]
    pub version: String,
    /// Feature names the pipeline was fitted on, in input order
    pub features: Vec<String>,
    pub scaler: ScalerParams,
    /// Cluster centroids in scaled space, one row per cluster
    pub centroids: Vec<Vec<f64>>,
}

impl KMeansPipeline {
    /// Load and check a pipeline artifact
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact {}", path.display()))?;
        let pipeline: KMeansPipeline = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse model artifact {}", path.display()))?;
        pipeline.check()?;

        info!(
            path = %path.display(),
            version = %pipeline.version,
            clusters = pipeline.n_clusters(),
            "Model pipeline loaded"
        );
        Ok(pipeline)
    }

    /// Verify the artifact matches the feature schema and is usable
    pub fn check(&self) -> crate::Result<()> {
        if self.features.iter().map(String::as_str).ne(FEATURES.iter().copied()) {
            anyhow::bail!(
                "Model expects features [{}] but the dashboard provides [{}]",
                self.features.join(", "),
                FEATURES.join(", ")
            );
        }
        if self.scaler.mean.len() != N_FEATURES || self.scaler.scale.len() != N_FEATURES {
            anyhow::bail!("Scaler must have exactly {} means and scales", N_FEATURES);
        }
        if self.scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            anyhow::bail!("Scaler scales must be finite and non-zero");
        }
        if self.centroids.is_empty() {
            anyhow::bail!("Model has no centroids");
        }
        if let Some(bad) = self.centroids.iter().position(|c| c.len() != N_FEATURES) {
            anyhow::bail!(
                "Centroid {} has {} dimensions, expected {}",
                bad,
                self.centroids[bad].len(),
                N_FEATURES
            );
        }
        Ok(())
    }

    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    /// Nearest centroid to an already scaled point
    fn nearest_centroid(&self, point: &[f64]) -> ClusterId {
        let mut min_distance = f64::INFINITY;
        let mut closest_cluster = 0;

        for (cluster_idx, centroid) in self.centroids.iter().enumerate() {
            let distance: f64 = point
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum();

            if distance < min_distance {
                min_distance = distance;
                closest_cluster = cluster_idx;
            }
        }

        closest_cluster
    }

    fn scale_row(&self, row: ArrayView1<f64>) -> Vec<f64> {
        row.iter()
            .zip(self.scaler.mean.iter().zip(self.scaler.scale.iter()))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect()
    }
}

impl ClusterPipeline for KMeansPipeline {
    fn predict(&self, features: &Array2<f64>) -> crate::Result<Vec<ClusterId>> {
        if features.ncols() != N_FEATURES {
            anyhow::bail!(
                "Feature matrix has {} columns, expected {}",
                features.ncols(),
                N_FEATURES
            );
        }
        if features.iter().any(|v| !v.is_finite()) {
            anyhow::bail!("Input contains NaN or infinite values");
        }

        Ok(features
            .outer_iter()
            .map(|row| self.nearest_centroid(&self.scale_row(row)))
            .collect())
    }
}

/// Predict the cluster of a single manually entered customer
pub fn predict_one(
    pipeline: &dyn ClusterPipeline,
    record: &FeatureRecord,
) -> Result<ClusterId, DashboardError> {
    let matrix =
        Array2::from_shape_vec((1, N_FEATURES), record.to_row().to_vec()).map_err(DashboardError::model)?;

    let labels = pipeline.predict(&matrix).map_err(|e| DashboardError::model(format!("{:#}", e)))?;
    let cluster = labels
        .first()
        .copied()
        .ok_or_else(|| DashboardError::model("pipeline returned no label"))?;

    debug!(cluster, "Single record predicted");
    Ok(cluster)
}

/// Predict clusters for a whole batch with a single pipeline call.
///
/// Returns the batch with a `cluster` column appended, rows in input order.
/// Nothing is returned on failure.
pub fn predict_batch(
    pipeline: &dyn ClusterPipeline,
    batch: &DataFrame,
) -> Result<DataFrame, DashboardError> {
    let missing = check_schema(batch, &FEATURES);
    if !missing.is_empty() {
        return Err(DashboardError::Schema(missing));
    }

    let matrix = feature_matrix(batch).map_err(|e| DashboardError::model(format!("{:#}", e)))?;
    let labels = pipeline
        .predict(&matrix)
        .map_err(|e| DashboardError::model(format!("{:#}", e)))?;

    if labels.len() != batch.height() {
        return Err(DashboardError::model(format!(
            "pipeline returned {} labels for {} rows",
            labels.len(),
            batch.height()
        )));
    }

    let labels: Vec<i64> = labels.into_iter().map(|c| c as i64).collect();
    let mut result = batch.clone();
    result
        .with_column(Series::new(CLUSTER_COLUMN, labels))
        .map_err(DashboardError::model)?;

    info!(rows = result.height(), "Batch predicted");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn test_pipeline() -> KMeansPipeline {
        KMeansPipeline {
            version: "test".to_string(),
            features: FEATURES.iter().map(|f| f.to_string()).collect(),
            scaler: ScalerParams {
                mean: vec![0.0; 6],
                scale: vec![1.0; 6],
            },
            centroids: vec![
                vec![0.0, 1.0, 0.0, 0.0, 0.0, 5.0],
                vec![500.0, 1.0, 1000.0, 10.0, 900.0, 1.0],
            ],
        }
    }

    /// Labels every row with its index modulo 3 and counts calls
    struct CountingPipeline {
        calls: Cell<usize>,
    }

    impl ClusterPipeline for CountingPipeline {
        fn predict(&self, features: &Array2<f64>) -> crate::Result<Vec<ClusterId>> {
            self.calls.set(self.calls.get() + 1);
            Ok((0..features.nrows()).map(|i| i % 3).collect())
        }
    }

    struct FailingPipeline;

    impl ClusterPipeline for FailingPipeline {
        fn predict(&self, _features: &Array2<f64>) -> crate::Result<Vec<ClusterId>> {
            anyhow::bail!("X has 7 features, but pipeline is expecting 6")
        }
    }

    fn batch() -> DataFrame {
        df!(
            "customer_unique_id" => &["c1", "c2", "c3", "c4"],
            "recency" => &[1i64, 2, 3, 4],
            "frequency" => &[1i64, 1, 2, 1],
            "monetary" => &[10.0, 20.0, 30.0, 40.0],
            "payment_installments" => &[1i64, 2, 3, 4],
            "price" => &[5.0, 6.0, 7.0, 8.0],
            "review_score" => &[5.0, 4.0, 3.0, 2.0]
        )
        .unwrap()
    }

    #[test]
    fn test_kmeans_assigns_nearest_centroid() {
        let pipeline = test_pipeline();
        let matrix = Array2::from_shape_vec(
            (2, 6),
            vec![
                10.0, 1.0, 20.0, 1.0, 15.0, 5.0, // close to centroid 0
                480.0, 1.0, 950.0, 9.0, 880.0, 1.0, // close to centroid 1
            ],
        )
        .unwrap();

        assert_eq!(pipeline.predict(&matrix).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_kmeans_rejects_bad_input() {
        let pipeline = test_pipeline();
        let narrow = Array2::<f64>::zeros((1, 5));
        assert!(pipeline.predict(&narrow).is_err());

        let mut nan = Array2::<f64>::zeros((1, 6));
        nan[[0, 2]] = f64::NAN;
        assert!(pipeline.predict(&nan).is_err());
    }

    #[test]
    fn test_check_rejects_mismatched_schema() {
        let mut pipeline = test_pipeline();
        pipeline.features.swap(0, 1);
        assert!(pipeline.check().is_err());

        let mut pipeline = test_pipeline();
        pipeline.scaler.scale[3] = 0.0;
        assert!(pipeline.check().is_err());

        let mut pipeline = test_pipeline();
        pipeline.centroids[1].pop();
        assert!(pipeline.check().is_err());
    }

    #[test]
    fn test_load_round_trips_artifact() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&test_pipeline()).unwrap()).unwrap();

        let loaded = KMeansPipeline::load(file.path()).unwrap();
        assert_eq!(loaded, test_pipeline());
        assert_eq!(loaded.n_clusters(), 2);
    }

    #[test]
    fn test_predict_one() {
        let cluster = predict_one(&test_pipeline(), &FeatureRecord::default()).unwrap();
        assert_eq!(cluster, 0);

        let err = predict_one(&FailingPipeline, &FeatureRecord::default()).unwrap_err();
        match err {
            DashboardError::ModelInvocation(cause) => assert!(cause.contains("expecting 6")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_predict_batch_preserves_rows() {
        let pipeline = CountingPipeline { calls: Cell::new(0) };
        let input = batch();
        let result = predict_batch(&pipeline, &input).unwrap();

        assert_eq!(pipeline.calls.get(), 1);
        assert_eq!(result.height(), input.height());
        assert!(result
            .column("customer_unique_id")
            .unwrap()
            .equals(input.column("customer_unique_id").unwrap()));

        let clusters: Vec<i64> = result
            .column(CLUSTER_COLUMN)
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(clusters, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_predict_batch_skips_pipeline_on_missing_columns() {
        let pipeline = CountingPipeline { calls: Cell::new(0) };
        let input = batch().drop("monetary").unwrap();

        let err = predict_batch(&pipeline, &input).unwrap_err();
        assert_eq!(err, DashboardError::Schema(vec!["monetary".to_string()]));
        assert_eq!(pipeline.calls.get(), 0);
    }

    #[test]
    fn test_predict_batch_failure_is_reported() {
        let err = predict_batch(&FailingPipeline, &batch()).unwrap_err();
        assert!(matches!(err, DashboardError::ModelInvocation(_)));
    }

    #[test]
    fn test_predict_batch_empty() {
        let empty = batch().head(Some(0));
        let result = predict_batch(&test_pipeline(), &empty).unwrap();
        assert_eq!(result.height(), 0);
        assert!(result.column(CLUSTER_COLUMN).is_ok());
    }
}
