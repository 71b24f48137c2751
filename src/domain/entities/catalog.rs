use crate::domain::values::parser::SourceParser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One external feed endpoint. Maintained out of band (seed command); this
/// core only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub category_id: i64,
    /// Category name, denormalized at load time for payload normalization.
    pub category: String,
    pub active: bool,
    /// Scan order for listings only; fetch concurrency ignores it.
    pub priority: i64,
    pub parser: SourceParser,
    pub timeout_ms: Option<u64>,
    pub headers: HashMap<String, String>,
}

/// A canonical tradable instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub unit: String,
    pub active: bool,
}

/// Point-in-time snapshot of the active catalog. Loaded once and swapped
/// atomically on explicit reload; a run works against the snapshot taken
/// when it started, never a mid-run re-read.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub sources: Vec<DataSource>,
    pub symbols: Vec<Symbol>,
}

impl Catalog {
    /// Active sources in priority order.
    pub fn active_sources(&self) -> Vec<&DataSource> {
        let mut sources: Vec<&DataSource> = self.sources.iter().filter(|s| s.active).collect();
        sources.sort_by_key(|s| s.priority);
        sources
    }

    pub fn has_active_sources(&self) -> bool {
        self.sources.iter().any(|s| s.active)
    }
}

fn default_true() -> bool {
    true
}

fn default_unit() -> String {
    crate::domain::entities::raw_item::DEFAULT_UNIT.to_string()
}

/// Seed-file shape for out-of-band catalog management.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub sources: Vec<SeedSource>,
    #[serde(default)]
    pub symbols: Vec<SeedSymbol>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSource {
    pub name: String,
    pub url: String,
    pub category: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub parser: SourceParser,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSymbol {
    pub name: String,
    pub category: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub categories: usize,
    pub sources: usize,
    pub symbols: usize,
}
