use crate::application::orchestrator::FetchOrchestrator;
use crate::domain::error::DomainError;
use crate::domain::ports::price_store::{AggregatedView, PriceStore};
use crate::domain::values::trigger::TriggerType;
use chrono::{Duration, Utc};
use log::info;
use std::sync::Arc;

/// Pull-based freshness: a stale or missing read is what causes a refresh.
/// There is no background loop here; the external scheduler owns proactive
/// runs, the gate is the safety net between them.
pub struct CacheGate {
    price_store: Arc<dyn PriceStore>,
    orchestrator: Arc<FetchOrchestrator>,
}

impl CacheGate {
    pub fn new(price_store: Arc<dyn PriceStore>, orchestrator: Arc<FetchOrchestrator>) -> Self {
        Self {
            price_store,
            orchestrator,
        }
    }

    pub async fn get_fresh_data(&self, ttl: Duration) -> Result<AggregatedView, DomainError> {
        match self.price_store.latest_day_view()? {
            None => {
                info!("no persisted data, triggering cache-miss run");
                self.refresh_and_read(TriggerType::CacheMiss).await
            }
            Some(view) => {
                let age = Utc::now() - view.meta.fetched_at;
                if age <= ttl {
                    Ok(view)
                } else {
                    info!(
                        "data is {}s old (ttl {}s), triggering cache-expired run",
                        age.num_seconds(),
                        ttl.num_seconds()
                    );
                    self.refresh_and_read(TriggerType::CacheExpired).await
                }
            }
        }
    }

    // No stale fallback: if the refresh run fails, the read fails.
    async fn refresh_and_read(&self, trigger: TriggerType) -> Result<AggregatedView, DomainError> {
        let summary = self.orchestrator.run_fetch(trigger).await?;
        if !summary.success {
            return Err(DomainError::Unavailable(format!(
                "refresh run {} failed: {}",
                summary.fetch_id,
                summary
                    .error
                    .unwrap_or_else(|| "no records stored".to_string())
            )));
        }
        self.price_store
            .latest_day_view()?
            .ok_or_else(|| DomainError::Unavailable("no price data after refresh".into()))
    }
}
