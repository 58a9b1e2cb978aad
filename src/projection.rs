//! Shaping prediction results for display and CSV export

use crate::data::cell_text;
use polars::prelude::*;

/// Placeholder shown for missing cells
pub const MISSING_MARKER: &str = "-";

/// File name offered for downloaded results
pub const EXPORT_FILE_NAME: &str = "olist_cluster_results.csv";

/// MIME type of exported results
pub const EXPORT_MIME: &str = "text/csv";

/// Known result columns and their display labels, in display order
pub const COLUMN_LABELS: &[(&str, &str)] = &[
    ("customer_unique_id", "Customer ID"),
    ("recency", "Recency"),
    ("frequency", "Frequency"),
    ("monetary", "Monetary"),
    ("payment_installments", "Payment Installments"),
    ("price", "Price"),
    ("review_score", "Review Score"),
    ("product_category_name_english", "Product Category"),
    ("payment_type", "Payment Method"),
    ("customer_city", "Customer City"),
    ("cluster", "Cluster"),
];

/// All-text table ready to be shown or exported
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DisplayTable {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> DisplayTable {
        DisplayTable {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Build a text table from any frame, keeping its own column names
    pub fn from_frame(frame: &DataFrame) -> crate::Result<Self> {
        let headers = frame
            .get_column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let columns = frame
            .get_columns()
            .iter()
            .map(cell_text)
            .collect::<PolarsResult<Vec<_>>>()?;

        Ok(Self {
            headers,
            rows: transpose(columns, frame.height()),
        })
    }
}

fn transpose(columns: Vec<Vec<Option<String>>>, height: usize) -> Vec<Vec<String>> {
    (0..height)
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    column[row]
                        .clone()
                        .unwrap_or_else(|| MISSING_MARKER.to_string())
                })
                .collect()
        })
        .collect()
}

/// Select the known columns present in `results`, relabel them and fill
/// missing cells with `MISSING_MARKER`.
pub fn project(results: &DataFrame, known_columns: &[(&str, &str)]) -> crate::Result<DisplayTable> {
    let present = results.get_column_names();
    let mut headers = Vec::new();
    let mut columns = Vec::new();

    for (name, label) in known_columns {
        if !present.contains(name) {
            continue;
        }
        headers.push(label.to_string());
        columns.push(cell_text(results.column(name)?)?);
    }

    Ok(DisplayTable {
        headers,
        rows: transpose(columns, results.height()),
    })
}

/// Serialize a table as UTF-8 CSV with a header row and no index column
pub fn to_exportable_bytes(table: &DisplayTable) -> crate::Result<Vec<u8>> {
    let columns: Vec<Series> = table
        .headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let values: Vec<&str> = table.rows.iter().map(|row| row[idx].as_str()).collect();
            Series::new(header, values)
        })
        .collect();
    let mut frame = DataFrame::new(columns)?;

    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut frame)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> DataFrame {
        df!(
            "customer_city" => &[Some("sao paulo"), None, Some("curitiba")],
            "customer_unique_id" => &["u1", "u2", "u3"],
            "recency" => &[10i64, 20, 30],
            "frequency" => &[1i64, 1, 2],
            "monetary" => &[Some(99.9), None, Some(f64::NAN)],
            "payment_installments" => &[1i64, 2, 3],
            "price" => &[80.0, 15.5, 200.0],
            "review_score" => &[5.0, 4.0, 1.0],
            "internal_note" => &["x", "y", "z"],
            "cluster" => &[0i64, 2, 1]
        )
        .unwrap()
    }

    #[test]
    fn test_project_selects_and_relabels() {
        let table = project(&results(), COLUMN_LABELS).unwrap();
        assert_eq!(
            table.headers,
            vec![
                "Customer ID",
                "Recency",
                "Frequency",
                "Monetary",
                "Payment Installments",
                "Price",
                "Review Score",
                "Customer City",
                "Cluster"
            ]
        );
        assert_eq!(table.height(), 3);
        assert_eq!(table.rows[0][0], "u1");
        assert_eq!(table.rows[0][3], "99.9");
        assert_eq!(table.rows[1][3], MISSING_MARKER);
        assert_eq!(table.rows[2][3], MISSING_MARKER);
        assert_eq!(table.rows[1][7], MISSING_MARKER);
        assert_eq!(table.rows[1][8], "2");
    }

    #[test]
    fn test_project_is_deterministic() {
        let first = project(&results(), COLUMN_LABELS).unwrap();
        let second = project(&results(), COLUMN_LABELS).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_export_round_trip() {
        let table = project(&results(), COLUMN_LABELS).unwrap();
        let bytes = to_exportable_bytes(&table).unwrap();

        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("Customer ID,Recency,Frequency,Monetary"));

        let parsed = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(std::io::Cursor::new(bytes))
            .finish()
            .unwrap();
        let reparsed = DisplayTable::from_frame(&parsed).unwrap();
        assert_eq!(reparsed, table);
    }

    #[test]
    fn test_head_limits_rows() {
        let table = project(&results(), COLUMN_LABELS).unwrap();
        assert_eq!(table.head(2).height(), 2);
        assert_eq!(table.head(10).height(), 3);
    }
}
