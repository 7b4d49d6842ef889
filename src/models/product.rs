use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::error::{AppError, Result};

/// Materialized product row. The store owns the authoritative copy; values
/// read into memory are disposable snapshots.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. Set means the row is excluded from scoped reads.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insert payload. Carries no id: the store assigns one on create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub stock: i64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: f64, stock: i64) -> Result<Self> {
        if stock < 0 {
            return Err(AppError::Validation(format!(
                "stock must be non-negative, got {stock}"
            )));
        }
        Ok(Self {
            name: name.into(),
            price,
            stock,
        })
    }
}

/// Parse the CDC price text as a plain decimal literal.
///
/// Debezium may ship NUMERIC columns in an encoded form; until that
/// encoding is confirmed we accept only text that is already a decimal
/// number and reject everything else instead of guessing.
pub fn parse_price(text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| AppError::Validation(format!("unparseable price text: {text:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_plain_decimal() {
        assert_eq!(parse_price("100").unwrap(), 100.0);
        assert_eq!(parse_price("0.25").unwrap(), 0.25);
        assert_eq!(parse_price(" 19.90 ").unwrap(), 19.9);
    }

    #[test]
    fn test_parse_price_rejects_encoded_text() {
        assert!(parse_price("AMTI").is_err());
        assert!(parse_price("").is_err());
        assert!(parse_price("NaN").is_err());
    }

    #[test]
    fn test_new_product_rejects_negative_stock() {
        assert!(NewProduct::new("Apple", 1.0, -1).is_err());
        assert!(NewProduct::new("Apple", 1.0, 0).is_ok());
    }
}
