//! Terminal rendering of tables, status lines and segment cards

use crate::data::FeatureSummary;
use crate::model::ClusterId;
use crate::projection::DisplayTable;
use crate::segment::Segment;
use clap::ValueEnum;
use colored::Colorize;
use std::io::Write;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Output format for prediction results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable card (default)
    #[default]
    Table,
    /// JSON object
    Json,
}

/// "payment_installments" -> "Payment Installments"
pub fn title_case(column: &str) -> String {
    column
        .replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + chars.as_str().to_lowercase().as_str()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a display table with a rounded border
pub fn render_table(table: &DisplayTable) -> String {
    if table.headers.is_empty() {
        return "(no columns)".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(table.headers.iter().cloned());
    for row in &table.rows {
        builder.push_record(row.iter().cloned());
    }
    builder.build().with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Std")]
    std: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "25%")]
    q25: String,
    #[tabled(rename = "50%")]
    median: String,
    #[tabled(rename = "75%")]
    q75: String,
    #[tabled(rename = "Max")]
    max: String,
}

fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{:.2}", value)
    }
}

/// Render descriptive statistics, one feature per row
pub fn render_summaries(summaries: &[FeatureSummary]) -> String {
    let rows: Vec<SummaryRow> = summaries
        .iter()
        .map(|s| SummaryRow {
            feature: title_case(&s.feature),
            count: s.count,
            mean: format_stat(s.mean),
            std: format_stat(s.std),
            min: format_stat(s.min),
            q25: format_stat(s.q25),
            median: format_stat(s.median),
            q75: format_stat(s.q75),
            max: format_stat(s.max),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Render the predicted cluster and its segment description
pub fn render_segment(cluster: ClusterId, segment: &Segment) -> String {
    let mut card = String::new();
    card.push_str(&format!(
        "{} {}\n\n",
        "Prediction result:".bold(),
        format!("Cluster {}", cluster).cyan().bold()
    ));

    match segment {
        Segment::Known(profile) => {
            let (r, g, b) = profile.accent;
            card.push_str(&format!(
                "{} {}\n",
                "Segment:".bold(),
                profile.name.truecolor(r, g, b).bold()
            ));
            card.push_str(&format!("{} {}\n\n", "Characteristics:".bold(), profile.characteristics));
            card.push_str(&format!("{}\n", "Retention strategy:".bold()));
            for item in profile.retention {
                card.push_str(&format!("  - {}\n", item));
            }
            card.push_str(&format!("\n{}\n", "Campaign strategy:".bold()));
            for item in profile.campaign {
                card.push_str(&format!("  - {}\n", item));
            }
        }
        Segment::Unknown(id) => {
            card.push_str(&format!(
                "{} no description is available for cluster {}\n",
                "Segment:".bold(),
                id
            ));
        }
    }

    card
}

/// Print a success message
pub fn print_success(out: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(out, "{} {}", "✓".green().bold(), message)
}

/// Print an error message
pub fn print_error(out: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(out, "{} {}", "✗".red().bold(), message)
}

/// Print a warning message
pub fn print_warning(out: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(out, "{} {}", "⚠".yellow().bold(), message)
}

/// Print an info message
pub fn print_info(out: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(out, "{} {}", "ℹ".blue().bold(), message)
}
