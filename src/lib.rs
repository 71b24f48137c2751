pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::cache_gate::CacheGate;
use crate::application::orchestrator::{CatalogHandle, FetchOrchestrator};
use crate::application::persister::Persister;
use crate::domain::entities::catalog::{CatalogSeed, DataSource, SeedReport};
use crate::domain::entities::fetch_run::FetchSummary;
use crate::domain::error::DomainError;
use crate::domain::ports::catalog_store::CatalogStore;
use crate::domain::ports::price_store::{AggregatedView, PriceStats, PriceStore};
use crate::domain::ports::source_fetcher::SourceFetcher;
use crate::domain::values::trigger::TriggerType;
use crate::infrastructure::http::HttpSourceFetcher;
use crate::infrastructure::sqlite::catalog_repo::SqliteCatalogRepo;
use crate::infrastructure::sqlite::migrations::run_migrations;
use crate::infrastructure::sqlite::price_repo::SqlitePriceRepo;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, RwLock};

pub struct RateWatch {
    catalog_store: Arc<dyn CatalogStore>,
    price_store: Arc<dyn PriceStore>,
    catalog: CatalogHandle,
    orchestrator: Arc<FetchOrchestrator>,
    cache_gate: CacheGate,
}

impl RateWatch {
    pub fn new(db_path: &str) -> Result<Self, DomainError> {
        Self::with_fetcher(db_path, Arc::new(HttpSourceFetcher::new()))
    }

    /// Wire the pipeline with an injected fetcher (tests swap in a mock).
    pub fn with_fetcher(
        db_path: &str,
        fetcher: Arc<dyn SourceFetcher>,
    ) -> Result<Self, DomainError> {
        // One shared connection behind a mutex: both repos see the same
        // database whether the path is a file or `:memory:`.
        let conn = open_connection(db_path)?;
        run_migrations(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        let catalog_store: Arc<dyn CatalogStore> = Arc::new(SqliteCatalogRepo::new(conn.clone()));
        let price_store: Arc<dyn PriceStore> = Arc::new(SqlitePriceRepo::new(conn));

        // Explicit catalog snapshot handle: loaded here, swapped whole on
        // reload, read once per run.
        let catalog: CatalogHandle = Arc::new(RwLock::new(Some(Arc::new(
            catalog_store.load_catalog()?,
        ))));

        let persister = Persister::new(catalog_store.clone(), price_store.clone());
        let orchestrator = Arc::new(FetchOrchestrator::new(
            catalog.clone(),
            fetcher,
            persister,
        ));
        let cache_gate = CacheGate::new(price_store.clone(), orchestrator.clone());

        Ok(Self {
            catalog_store,
            price_store,
            catalog,
            orchestrator,
            cache_gate,
        })
    }

    /// Re-read active catalog rows and swap the snapshot. Returns the active
    /// source count of the new snapshot.
    pub fn reload_catalog(&self) -> Result<usize, DomainError> {
        let loaded = Arc::new(self.catalog_store.load_catalog()?);
        let count = loaded.active_sources().len();
        let mut guard = self
            .catalog
            .write()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        *guard = Some(loaded);
        Ok(count)
    }

    // Delegating methods
    pub async fn run_fetch(&self, trigger: TriggerType) -> Result<FetchSummary, DomainError> {
        self.orchestrator.run_fetch(trigger).await
    }

    pub async fn fresh_data(&self, ttl_secs: i64) -> Result<AggregatedView, DomainError> {
        self.cache_gate
            .get_fresh_data(chrono::Duration::seconds(ttl_secs))
            .await
    }

    pub fn seed(&self, seed: &CatalogSeed) -> Result<SeedReport, DomainError> {
        let report = self.catalog_store.seed(seed)?;
        self.reload_catalog()?;
        Ok(report)
    }

    pub fn sources(&self) -> Result<Vec<DataSource>, DomainError> {
        self.catalog_store.list_sources()
    }

    pub fn stats(&self) -> Result<PriceStats, DomainError> {
        self.price_store.stats()
    }

    pub fn count_by_fetch_id(&self, fetch_id: &str) -> Result<usize, DomainError> {
        self.price_store.count_by_fetch_id(fetch_id)
    }
}

fn open_connection(db_path: &str) -> Result<Connection, DomainError> {
    let conn = Connection::open(db_path)
        .map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| DomainError::Database(format!("FK error: {e}")))?;
    Ok(conn)
}
