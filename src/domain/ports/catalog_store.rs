use crate::domain::entities::catalog::{Catalog, CatalogSeed, DataSource, SeedReport};
use crate::domain::error::DomainError;
use std::collections::HashMap;

/// Read access to the configured sources, symbols and categories, plus the
/// out-of-band seeding entry point. The ingestion core treats the catalog as
/// read-only.
pub trait CatalogStore: Send + Sync {
    /// Load the active rows as a snapshot.
    fn load_catalog(&self) -> Result<Catalog, DomainError>;

    /// name → id for active symbols only.
    fn active_symbol_ids(&self) -> Result<HashMap<String, i64>, DomainError>;

    /// name → id for active data sources only.
    fn active_source_ids(&self) -> Result<HashMap<String, i64>, DomainError>;

    /// All sources (active or not) in priority order, for listings.
    fn list_sources(&self) -> Result<Vec<DataSource>, DomainError>;

    /// Upsert catalog rows by name. Catalog management, not ingestion.
    fn seed(&self, seed: &CatalogSeed) -> Result<SeedReport, DomainError>;
}
