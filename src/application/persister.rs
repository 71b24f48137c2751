use crate::application::validator::{validate, PriceCandidate};
use crate::domain::entities::price_record::PriceRecord;
use crate::domain::entities::raw_item::RawItem;
use crate::domain::error::DomainError;
use crate::domain::ports::catalog_store::CatalogStore;
use crate::domain::ports::price_store::PriceStore;
use log::warn;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves merged fetch data against the active catalog and writes one
/// atomic batch per run. The only place atomicity matters: either every
/// valid row of a run lands, or none do.
pub struct Persister {
    catalog_store: Arc<dyn CatalogStore>,
    price_store: Arc<dyn PriceStore>,
}

impl Persister {
    pub fn new(catalog_store: Arc<dyn CatalogStore>, price_store: Arc<dyn PriceStore>) -> Self {
        Self {
            catalog_store,
            price_store,
        }
    }

    pub fn store_batch(
        &self,
        merged: &HashMap<String, Vec<RawItem>>,
        fetch_id: &str,
    ) -> Result<usize, DomainError> {
        let symbol_ids = self.catalog_store.active_symbol_ids()?;
        let source_ids = self.catalog_store.active_source_ids()?;

        // Stage the full row list before touching a connection, so shape
        // problems fail fast without holding a transaction open.
        let mut rows: Vec<PriceRecord> = Vec::new();
        let mut dropped_drift = 0usize;
        let mut dropped_invalid = 0usize;

        for items in merged.values() {
            for item in items {
                let candidate = PriceCandidate {
                    symbol_id: symbol_ids.get(&item.symbol).copied(),
                    data_source_id: source_ids.get(&item.source).copied(),
                    price: item.price.clone(),
                    change_percent: item.change_percent.clone(),
                };
                match validate(&candidate) {
                    Ok(valid) => rows.push(PriceRecord::new(
                        valid.symbol_id,
                        valid.data_source_id,
                        valid.price,
                        valid.change_percent,
                        fetch_id,
                    )),
                    Err(reason) if reason.is_drift() => {
                        // Catalog drift: the row references a name no longer
                        // active. Dropped, not retried.
                        warn!(
                            "dropping '{}' from {}: {reason}",
                            item.symbol, item.source
                        );
                        dropped_drift += 1;
                    }
                    Err(reason) => {
                        warn!(
                            "dropping '{}' from {}: {reason}",
                            item.symbol, item.source
                        );
                        dropped_invalid += 1;
                    }
                }
            }
        }

        if dropped_drift + dropped_invalid > 0 {
            warn!(
                "fetch {fetch_id}: dropped {dropped_drift} drifted and {dropped_invalid} invalid rows"
            );
        }

        if rows.is_empty() {
            return Ok(0);
        }

        self.price_store.insert_batch(&rows)
    }
}
