//! Command-line interface definitions and argument parsing

use crate::config::DashboardConfig;
use crate::features::{FeatureRecord, N_FEATURES};
use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Customer segmentation dashboard over a pre-trained RFM K-Means pipeline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file (defaults to ./segmentforge.toml if present)
    #[arg(long, env = "SEGMENTFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the customer dataset CSV
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Path to the model pipeline artifact (JSON)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the welcome page
    Home,

    /// Preview the first rows of the dataset
    Preview {
        /// Number of rows to show (5 to 100)
        #[arg(short, long)]
        rows: Option<usize>,
    },

    /// Descriptive statistics of the model features
    Stats,

    /// Render exploratory charts as PNG files
    Eda {
        /// Feature to plot as a histogram
        #[arg(short, long, default_value = "recency")]
        feature: String,

        /// Output directory for the charts
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Predict the cluster of one customer from manual input
    Predict(ManualInput),

    /// Predict clusters for every row of a CSV file and export the results
    Batch {
        /// CSV file with the six feature columns
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the results CSV
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of result rows to display (5 to 100)
        #[arg(short, long)]
        rows: Option<usize>,
    },

    /// Start an interactive session
    Shell,
}

/// Manual feature input
#[derive(clap::Args, Debug, Clone)]
pub struct ManualInput {
    /// Days since the last purchase
    #[arg(long, default_value_t = 200, allow_negative_numbers = true)]
    pub recency: i64,

    /// Number of orders
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub frequency: i64,

    /// Total spend
    #[arg(long, default_value_t = 120.0, allow_negative_numbers = true)]
    pub monetary: f64,

    /// Number of payment installments
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    pub payment_installments: i64,

    /// Product price
    #[arg(long, default_value_t = 80.0, allow_negative_numbers = true)]
    pub price: f64,

    /// Review score between 1 and 5
    #[arg(long, default_value_t = 5.0, allow_negative_numbers = true)]
    pub review_score: f64,

    /// All six values as one comma-separated string, overriding the flags
    /// Example: --values "200,1,120.0,2,80.0,5.0"
    #[arg(long, allow_hyphen_values = true)]
    pub values: Option<String>,

    /// Output format
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
}

impl ManualInput {
    /// The record described by the flags or by `--values`
    pub fn to_record(&self) -> crate::Result<FeatureRecord> {
        if let Some(ref values) = self.values {
            return parse_feature_values(values);
        }

        Ok(FeatureRecord {
            recency: self.recency,
            frequency: self.frequency,
            monetary: self.monetary,
            payment_installments: self.payment_installments,
            price: self.price,
            review_score: self.review_score,
        })
    }
}

impl Args {
    /// Apply command-line overrides on top of the loaded config
    pub fn apply_overrides(&self, config: &mut DashboardConfig) {
        if let Some(ref data) = self.data {
            config.data_path = data.clone();
        }
        if let Some(ref model) = self.model {
            config.model_path = model.clone();
        }
    }
}

/// Parse six feature values separated by commas and/or whitespace.
///
/// Expected order: recency, frequency, monetary, payment_installments,
/// price, review_score.
pub fn parse_feature_values(input: &str) -> crate::Result<FeatureRecord> {
    let parts: Vec<&str> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != N_FEATURES {
        anyhow::bail!(
            "Expected {} values 'recency,frequency,monetary,payment_installments,price,review_score', got {}",
            N_FEATURES,
            parts.len()
        );
    }

    let integer = |idx: usize, name: &str| -> crate::Result<i64> {
        parts[idx]
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid {} value: {}", name, parts[idx]))
    };
    let real = |idx: usize, name: &str| -> crate::Result<f64> {
        parts[idx]
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid {} value: {}", name, parts[idx]))
    };

    Ok(FeatureRecord {
        recency: integer(0, "recency")?,
        frequency: integer(1, "frequency")?,
        monetary: real(2, "monetary")?,
        payment_installments: integer(3, "payment_installments")?,
        price: real(4, "price")?,
        review_score: real(5, "review_score")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feature_values() {
        let record = parse_feature_values("200,1,120.0,2,80.0,5.0").unwrap();
        assert_eq!(record, FeatureRecord::default());

        let record = parse_feature_values("30 4 500 1 99.5 4").unwrap();
        assert_eq!(record.frequency, 4);
        assert_eq!(record.price, 99.5);

        assert!(parse_feature_values("1,2,3").is_err());
        assert!(parse_feature_values("1.5,1,120,2,80,5").is_err());
        assert!(parse_feature_values("a,1,120,2,80,5").is_err());
    }

    #[test]
    fn test_negative_values_parse_for_validation() {
        let record = parse_feature_values("-1,0,120,2,80,0").unwrap();
        assert_eq!(record.recency, -1);
        assert_eq!(record.validate().len(), 3);
    }

    #[test]
    fn test_args_parse_predict_flags() {
        let args = Args::try_parse_from([
            "segmentforge",
            "predict",
            "--recency",
            "-1",
            "--review-score",
            "4.5",
        ])
        .unwrap();

        match args.command {
            Command::Predict(input) => {
                let record = input.to_record().unwrap();
                assert_eq!(record.recency, -1);
                assert_eq!(record.review_score, 4.5);
                assert_eq!(record.monetary, 120.0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_overrides() {
        let args =
            Args::try_parse_from(["segmentforge", "--data", "other.csv", "stats"]).unwrap();
        let mut config = DashboardConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.data_path, PathBuf::from("other.csv"));
        assert_eq!(config.model_path, DashboardConfig::default().model_path);
    }
}
