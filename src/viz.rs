//! Exploratory charts rendered with Plotters

use crate::data::{category_counts, histogram, numeric_values, HistogramBin};
use crate::output::title_case;
use plotters::prelude::*;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bar colour for categorical charts
const BAR_COLOR: RGBColor = RGBColor(79, 172, 254);

/// Number of bins in the feature histogram
pub const HISTOGRAM_BINS: usize = 40;

/// Vertical bar chart of category counts
pub fn create_category_chart(
    counts: &[(String, usize)],
    title: &str,
    x_desc: &str,
    output_path: &Path,
) -> crate::Result<()> {
    let max_count = counts.iter().map(|(_, c)| *c).max().unwrap_or(1) as f64;

    let root = BitMapBackend::new(output_path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..counts.len() as f64, 0f64..(max_count * 1.1))?;

    let label_for = |x: &f64| {
        let idx = x.floor() as usize;
        if (x - idx as f64 - 0.5).abs() < 1e-9 {
            counts.get(idx).map(|(l, _)| l.clone()).unwrap_or_default()
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(counts.len() * 2 + 1)
        .x_label_formatter(&label_for)
        .x_desc(x_desc)
        .y_desc("Count")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, (_, count))| {
        Rectangle::new(
            [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, *count as f64)],
            BAR_COLOR.filled(),
        )
    }))?;

    root.present()?;
    debug!(path = %output_path.display(), "Category chart saved");
    Ok(())
}

/// Horizontal bar chart, largest category at the top
pub fn create_horizontal_category_chart(
    counts: &[(String, usize)],
    title: &str,
    y_desc: &str,
    output_path: &Path,
) -> crate::Result<()> {
    // Ascending order puts the largest bar last, which plots at the top
    let mut ascending = counts.to_vec();
    ascending.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)));
    let max_count = ascending.iter().map(|(_, c)| *c).max().unwrap_or(1) as f64;

    let root = BitMapBackend::new(output_path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(220)
        .build_cartesian_2d(0f64..(max_count * 1.1), 0f64..ascending.len() as f64)?;

    let label_for = |y: &f64| {
        let idx = y.floor() as usize;
        if (y - idx as f64 - 0.5).abs() < 1e-9 {
            ascending.get(idx).map(|(l, _)| l.clone()).unwrap_or_default()
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(ascending.len() * 2 + 1)
        .y_label_formatter(&label_for)
        .x_desc("Total Orders")
        .y_desc(y_desc)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(ascending.iter().enumerate().map(|(i, (_, count))| {
        Rectangle::new(
            [(0.0, i as f64 + 0.1), (*count as f64, i as f64 + 0.9)],
            BAR_COLOR.filled(),
        )
    }))?;

    root.present()?;
    debug!(path = %output_path.display(), "Horizontal category chart saved");
    Ok(())
}

/// Histogram of one numeric feature
pub fn create_histogram(
    bins: &[HistogramBin],
    feature: &str,
    output_path: &Path,
) -> crate::Result<()> {
    let (x_min, x_max) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.start, last.end),
        _ => anyhow::bail!("No values to plot for feature '{}'", feature),
    };
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(1) as f64;
    let label = title_case(feature);

    let root = BitMapBackend::new(output_path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Distribution of {}", label), ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, 0f64..(max_count * 1.1))?;

    chart
        .configure_mesh()
        .x_desc(label.as_str())
        .y_desc("Count")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(bins.iter().map(|bin| {
        Rectangle::new([(bin.start, 0.0), (bin.end, bin.count as f64)], BAR_COLOR.filled())
    }))?;

    root.present()?;
    debug!(path = %output_path.display(), "Histogram saved");
    Ok(())
}

/// Render every EDA chart the dataset supports into `out_dir`.
///
/// Categorical charts are skipped when their column is absent. Returns the
/// paths written.
pub fn generate_eda_report(
    dataset: &DataFrame,
    feature: &str,
    out_dir: &Path,
) -> crate::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    if let Some(counts) = category_counts(dataset, "payment_type", None)? {
        let path = out_dir.join("payment_method_distribution.png");
        create_category_chart(&counts, "Payment Method Distribution", "Payment Type", &path)?;
        written.push(path);
    }

    if let Some(counts) = category_counts(dataset, "customer_state", Some(5))? {
        let path = out_dir.join("top_customer_states.png");
        create_category_chart(
            &counts,
            "Top 5 Customer State by Orders",
            "Customer State",
            &path,
        )?;
        written.push(path);
    }

    if let Some(counts) = category_counts(dataset, "product_category_name_english", Some(10))? {
        let path = out_dir.join("top_product_categories.png");
        create_horizontal_category_chart(
            &counts,
            "Top 10 Product Categories by Orders",
            "Product Category",
            &path,
        )?;
        written.push(path);
    }

    let values = numeric_values(dataset, feature)?;
    let bins = histogram(&values, HISTOGRAM_BINS);
    let path = out_dir.join(format!("histogram_{}.png", feature));
    create_histogram(&bins, feature, &path)?;
    written.push(path);

    info!(charts = written.len(), dir = %out_dir.display(), "EDA charts generated");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use tempfile::tempdir;

    fn create_test_data() -> DataFrame {
        df!(
            "recency" => &[10i64, 200, 35, 400],
            "payment_type" => &["credit_card", "boleto", "credit_card", "voucher"],
            "customer_state" => &["SP", "RJ", "SP", "MG"],
            "product_category_name_english" => &["housewares", "toys", "housewares", "computers"]
        )
        .unwrap()
    }

    fn counts() -> Vec<(String, usize)> {
        vec![("credit_card".to_string(), 3), ("boleto".to_string(), 1)]
    }

    #[test]
    fn test_create_category_chart() {
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("test_categories.png");

        let result = create_category_chart(&counts(), "Payments", "Payment Type", &output_path);
        assert!(result.is_ok());
        assert!(output_path.exists());
    }

    #[test]
    fn test_create_horizontal_category_chart() {
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("test_horizontal.png");

        let result =
            create_horizontal_category_chart(&counts(), "Categories", "Category", &output_path);
        assert!(result.is_ok());
        assert!(output_path.exists());
    }

    #[test]
    fn test_create_histogram() {
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("test_histogram.png");
        let bins = histogram(&[1.0, 2.0, 2.5, 7.0], HISTOGRAM_BINS);

        let result = create_histogram(&bins, "recency", &output_path);
        assert!(result.is_ok());
        assert!(output_path.exists());
    }

    #[test]
    fn test_create_histogram_without_values_fails() {
        let temp_dir = tempdir().unwrap();
        let output_path = temp_dir.path().join("empty.png");

        let err = create_histogram(&[], "price", &output_path).unwrap_err();
        assert!(err.to_string().contains("No values to plot for feature 'price'"));
        assert!(!output_path.exists());
    }

    #[test]
    fn test_generate_eda_report() {
        let temp_dir = tempdir().unwrap();
        let out_dir = temp_dir.path().join("charts");

        let written = generate_eda_report(&create_test_data(), "recency", &out_dir).unwrap();
        assert_eq!(written.len(), 4);
        assert!(written.iter().all(|path| path.exists()));
        assert!(out_dir.join("histogram_recency.png").exists());
    }

    #[test]
    fn test_generate_eda_report_skips_absent_columns() {
        let temp_dir = tempdir().unwrap();
        let dataset = create_test_data()
            .drop("customer_state")
            .unwrap()
            .drop("product_category_name_english")
            .unwrap();

        let written = generate_eda_report(&dataset, "recency", temp_dir.path()).unwrap();
        assert_eq!(
            written,
            vec![
                temp_dir.path().join("payment_method_distribution.png"),
                temp_dir.path().join("histogram_recency.png"),
            ]
        );
        assert!(!temp_dir.path().join("top_customer_states.png").exists());
    }
}
