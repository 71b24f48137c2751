use crate::domain::entities::price_record::PriceRecord;
use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Latest-day aggregate read back by the cache gate: the stored rows of the
/// most recent day, grouped by category, one entry per symbol.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedView {
    pub data: BTreeMap<String, Vec<ViewItem>>,
    pub meta: ViewMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewItem {
    pub symbol: String,
    pub price: Decimal,
    pub change_percent: Option<Decimal>,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewMeta {
    /// Timestamp of the newest row in the view.
    pub fetched_at: DateTime<Utc>,
    /// Distinct source names contributing to the view, sorted.
    pub source_names: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PriceStats {
    pub total_records: usize,
    pub by_category: Vec<(String, usize)>,
    pub fetch_runs: usize,
    pub latest_created_at: Option<DateTime<Utc>>,
}

pub trait PriceStore: Send + Sync {
    /// Insert the whole batch in one transaction: all rows land or none do.
    fn insert_batch(&self, records: &[PriceRecord]) -> Result<usize, DomainError>;

    /// Aggregate of the latest day's rows, or None when nothing is stored.
    fn latest_day_view(&self) -> Result<Option<AggregatedView>, DomainError>;

    /// Rows written under one correlation id.
    fn count_by_fetch_id(&self, fetch_id: &str) -> Result<usize, DomainError>;

    fn stats(&self) -> Result<PriceStats, DomainError>;
}
