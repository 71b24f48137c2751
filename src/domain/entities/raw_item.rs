use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unit assumed when a feed item omits one.
pub const DEFAULT_UNIT: &str = "USD";

/// One normalized quote as delivered by a source, before catalog resolution.
/// Prices stay as raw strings here; coercion happens at validation so a bad
/// number rejects one row instead of failing a whole payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawItem {
    pub symbol: String,
    pub category: String,
    pub name: String,
    /// Source name, carried so persistence can resolve the source id against
    /// the active catalog at write time.
    pub source: String,
    pub price: String,
    pub change_percent: Option<String>,
    pub unit: String,
}

/// Normalized result of fetching one source: the same shape for every
/// payload format, so downstream code never branches on the feed.
#[derive(Debug, Clone)]
pub struct SourcePayload {
    pub source_id: i64,
    pub category_id: i64,
    pub fetch_id: String,
    pub data: HashMap<String, Vec<RawItem>>,
}
