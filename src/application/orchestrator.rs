use crate::application::persister::Persister;
use crate::domain::entities::catalog::Catalog;
use crate::domain::entities::fetch_run::FetchSummary;
use crate::domain::entities::raw_item::RawItem;
use crate::domain::error::DomainError;
use crate::domain::ports::source_fetcher::SourceFetcher;
use crate::domain::values::trigger::TriggerType;
use futures::future::join_all;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use uuid::Uuid;

/// Shared handle to the current catalog snapshot. Swapped whole on reload;
/// a run clones the Arc once at start and never re-reads mid-run.
pub type CatalogHandle = Arc<RwLock<Option<Arc<Catalog>>>>;

/// Fans out one fetch per active source, applies the partial-failure policy
/// and hands the merged result to the persister. Everything below the run
/// boundary is absorbed into the returned summary; the only hard error is
/// the missing-catalog precondition.
pub struct FetchOrchestrator {
    catalog: CatalogHandle,
    fetcher: Arc<dyn SourceFetcher>,
    persister: Persister,
}

impl FetchOrchestrator {
    pub fn new(catalog: CatalogHandle, fetcher: Arc<dyn SourceFetcher>, persister: Persister) -> Self {
        Self {
            catalog,
            fetcher,
            persister,
        }
    }

    pub async fn run_fetch(&self, trigger: TriggerType) -> Result<FetchSummary, DomainError> {
        let started = Instant::now();
        let fetch_id = Uuid::new_v4().to_string();

        let catalog = self.snapshot()?;
        if !catalog.has_active_sources() {
            return Err(DomainError::Precondition(
                "catalog has no active sources; seed and reload before fetching".into(),
            ));
        }
        let sources = catalog.active_sources();

        // Fan-out/fan-in barrier: every source either succeeds or exhausts
        // its retries before the run proceeds. A failing source never
        // cancels another's in-flight request.
        let futures = sources
            .iter()
            .map(|source| self.fetcher.fetch(source, &fetch_id));
        let results = join_all(futures).await;

        let total = results.len();
        let mut failed = 0usize;
        let mut merged: HashMap<String, Vec<RawItem>> = HashMap::new();
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(payload) => {
                    for (category, items) in payload.data {
                        merged.entry(category).or_default().extend(items);
                    }
                }
                Err(e) => {
                    warn!("fetch {fetch_id}: source {} failed: {e}", source.name);
                    failed += 1;
                }
            }
        }

        // Strict majority threshold: a minority outage is absorbed, a
        // majority one likely means a systemic problem where writing skewed
        // data would corrupt history.
        if failed * 2 > total {
            let summary = FetchSummary {
                success: false,
                fetch_id,
                trigger,
                records_stored: 0,
                sources_failed: failed,
                sources_total: total,
                duration_ms: started.elapsed().as_millis() as u64,
                error: Some("more than half of sources failed".into()),
            };
            warn!(
                "fetch {}: aborted, {failed}/{total} sources failed",
                summary.fetch_id
            );
            return Ok(summary);
        }

        let summary = match self.persister.store_batch(&merged, &fetch_id) {
            Ok(records_stored) => FetchSummary {
                success: records_stored > 0,
                fetch_id,
                trigger,
                records_stored,
                sources_failed: failed,
                sources_total: total,
                duration_ms: started.elapsed().as_millis() as u64,
                error: None,
            },
            Err(e) => {
                let mut s = FetchSummary::failure(
                    &fetch_id,
                    trigger,
                    started.elapsed().as_millis() as u64,
                    e.to_string(),
                );
                s.sources_failed = failed;
                s.sources_total = total;
                s
            }
        };

        info!(
            "fetch {}: trigger={} stored={} failed_sources={}/{} duration={}ms success={}",
            summary.fetch_id,
            summary.trigger,
            summary.records_stored,
            summary.sources_failed,
            summary.sources_total,
            summary.duration_ms,
            summary.success
        );
        Ok(summary)
    }

    fn snapshot(&self) -> Result<Arc<Catalog>, DomainError> {
        self.catalog
            .read()
            .map_err(|e| DomainError::Precondition(e.to_string()))?
            .clone()
            .ok_or_else(|| {
                DomainError::Precondition("catalog not loaded; initialize before fetching".into())
            })
    }
}
