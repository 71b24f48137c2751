use crate::domain::values::trigger::TriggerType;
use serde::Serialize;

/// Outcome of one orchestration cycle. Ephemeral: returned to the trigger
/// caller for tracing, never persisted. The fetch id is the join key across
/// the price records the run wrote.
#[derive(Debug, Clone, Serialize)]
pub struct FetchSummary {
    pub success: bool,
    pub fetch_id: String,
    pub trigger: TriggerType,
    pub records_stored: usize,
    pub sources_failed: usize,
    pub sources_total: usize,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl FetchSummary {
    pub fn failure(fetch_id: &str, trigger: TriggerType, duration_ms: u64, error: String) -> Self {
        Self {
            success: false,
            fetch_id: fetch_id.to_string(),
            trigger,
            records_stored: 0,
            sources_failed: 0,
            sources_total: 0,
            duration_ms,
            error: Some(error),
        }
    }
}
