use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stored price observation. Immutable once written: never updated or
/// deleted by this core, only superseded by a later record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRecord {
    pub symbol_id: i64,
    pub data_source_id: i64,
    pub price: Decimal,
    pub change_percent: Option<Decimal>,
    /// Correlation id joining every record written by the same run.
    pub fetch_id: String,
    pub created_at: DateTime<Utc>,
}

impl PriceRecord {
    pub fn new(
        symbol_id: i64,
        data_source_id: i64,
        price: Decimal,
        change_percent: Option<Decimal>,
        fetch_id: &str,
    ) -> Self {
        Self {
            symbol_id,
            data_source_id,
            price,
            change_percent,
            fetch_id: fetch_id.to_string(),
            created_at: Utc::now(),
        }
    }
}
