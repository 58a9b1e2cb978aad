//! Feature schema shared by validation, schema checks and the model
//!
//! `FEATURES` is the one place where the model's expected input columns are
//! named. The artifact loader, the batch schema checker and the matrix
//! builders all read it, so a renamed or reordered feature shows up as a
//! load-time error instead of silently wrong clusters.

use serde::{Deserialize, Serialize};

/// Model input columns, in the order the pipeline expects them
pub const FEATURES: [&str; 6] = [
    "recency",
    "frequency",
    "monetary",
    "payment_installments",
    "price",
    "review_score",
];

/// Number of model input features
pub const N_FEATURES: usize = FEATURES.len();

/// One customer's feature vector as entered by hand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Days since last purchase
    pub recency: i64,
    /// Number of orders
    pub frequency: i64,
    /// Total spend
    pub monetary: f64,
    pub payment_installments: i64,
    pub price: f64,
    /// Average review score, 1 to 5
    pub review_score: f64,
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self {
            recency: 200,
            frequency: 1,
            monetary: 120.0,
            payment_installments: 2,
            price: 80.0,
            review_score: 5.0,
        }
    }
}

impl FeatureRecord {
    /// Check every field against its domain constraint
    pub fn validate(&self) -> Vec<String> {
        validate(
            self.recency,
            self.frequency,
            self.monetary,
            self.payment_installments,
            self.price,
            self.review_score,
        )
    }

    /// Feature values in `FEATURES` order
    pub fn to_row(&self) -> [f64; N_FEATURES] {
        [
            self.recency as f64,
            self.frequency as f64,
            self.monetary,
            self.payment_installments as f64,
            self.price,
            self.review_score,
        ]
    }
}

/// Validate manually entered feature values.
///
/// Each constraint is checked on its own and every violation is reported, so
/// the user sees all problems at once. An empty vector means the input may be
/// sent to the model.
pub fn validate(
    recency: i64,
    frequency: i64,
    monetary: f64,
    payment_installments: i64,
    price: f64,
    review_score: f64,
) -> Vec<String> {
    let mut errors = Vec::new();

    if recency < 0 {
        errors.push("Recency must not be negative.".to_string());
    }
    if frequency < 1 {
        errors.push("Frequency must be at least 1.".to_string());
    }
    // NaN fails these comparisons on purpose
    if !(monetary >= 0.0) {
        errors.push("Monetary must not be negative.".to_string());
    }
    if payment_installments < 0 {
        errors.push("Payment Installments must not be negative.".to_string());
    }
    if !(price >= 0.0) {
        errors.push("Price must not be negative.".to_string());
    }
    if !(1.0..=5.0).contains(&review_score) {
        errors.push("Review Score must be between 1 and 5.".to_string());
    }

    errors
}

/// Whether a raw matrix row in `FEATURES` order satisfies the same bounds as
/// `validate`. Values are compared as floats, so `-0.5` days is out of range.
pub fn row_in_domain(row: &[f64]) -> bool {
    match row {
        [recency, frequency, monetary, installments, price, review_score] => {
            *recency >= 0.0
                && *frequency >= 1.0
                && *monetary >= 0.0
                && *installments >= 0.0
                && *price >= 0.0
                && (1.0..=5.0).contains(review_score)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input_has_no_errors() {
        assert!(validate(0, 1, 0.0, 0, 0.0, 1.0).is_empty());
        assert!(validate(200, 1, 120.0, 2, 80.0, 5.0).is_empty());
        assert!(validate(10_000, 40, 1e6, 24, 5e4, 3.5).is_empty());
    }

    #[test]
    fn test_negative_recency() {
        let errors = validate(-1, 1, 120.0, 2, 80.0, 5.0);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_lowercase().contains("recency"));
    }

    #[test]
    fn test_violations_are_collected() {
        let errors = validate(200, 0, 120.0, 2, 80.0, 0.0);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Frequency"));
        assert!(errors[1].contains("Review Score"));

        let errors = validate(-5, 0, -1.0, -2, -3.0, 6.0);
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_review_score_bounds_are_inclusive() {
        assert!(validate(0, 1, 0.0, 0, 0.0, 1.0).is_empty());
        assert!(validate(0, 1, 0.0, 0, 0.0, 5.0).is_empty());
        assert_eq!(validate(0, 1, 0.0, 0, 0.0, 5.01).len(), 1);
        assert_eq!(validate(0, 1, 0.0, 0, 0.0, 0.99).len(), 1);
    }

    #[test]
    fn test_nan_is_rejected() {
        assert_eq!(validate(0, 1, f64::NAN, 0, 0.0, 4.0).len(), 1);
        assert_eq!(validate(0, 1, 0.0, 0, 0.0, f64::NAN).len(), 1);
    }

    #[test]
    fn test_record_row_order() {
        let row = FeatureRecord::default().to_row();
        assert_eq!(row, [200.0, 1.0, 120.0, 2.0, 80.0, 5.0]);
        assert!(row_in_domain(&row));
    }

    #[test]
    fn test_row_in_domain_compares_floats() {
        assert!(!row_in_domain(&[-0.5, 1.0, 120.0, 2.0, 80.0, 5.0]));
        assert!(!row_in_domain(&[10.0, 0.9, 120.0, 2.0, 80.0, 5.0]));
        assert!(!row_in_domain(&[10.0, 1.0, 120.0, 2.0, 80.0, f64::NAN]));
        assert!(row_in_domain(&[10.0, 1.0, 0.0, 0.0, 0.0, 1.0]));
        assert!(!row_in_domain(&[10.0, 1.0, 0.0]));
    }
}
