//! Shared test helpers.

use async_trait::async_trait;
use ratewatch::domain::entities::catalog::{CatalogSeed, DataSource, SeedSource, SeedSymbol};
use ratewatch::domain::entities::raw_item::{RawItem, SourcePayload};
use ratewatch::domain::ports::source_fetcher::{FetchError, SourceFetcher};
use ratewatch::domain::values::parser::SourceParser;
use ratewatch::RateWatch;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub enum MockResponse {
    Items(Vec<RawItem>),
    Fail(String),
}

/// Scriptable fetcher: each source name maps to a canned payload or a
/// definitive failure (retries are the real fetcher's concern).
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, MockResponse>>,
}

impl MockFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn succeed(&self, source: &str, items: Vec<RawItem>) {
        self.responses
            .lock()
            .unwrap()
            .insert(source.to_string(), MockResponse::Items(items));
    }

    pub fn fail(&self, source: &str, msg: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(source.to_string(), MockResponse::Fail(msg.to_string()));
    }
}

#[async_trait]
impl SourceFetcher for MockFetcher {
    async fn fetch(&self, source: &DataSource, fetch_id: &str) -> Result<SourcePayload, FetchError> {
        let responses = self.responses.lock().unwrap();
        match responses.get(&source.name) {
            Some(MockResponse::Items(items)) => {
                let mut data: HashMap<String, Vec<RawItem>> = HashMap::new();
                for item in items {
                    data.entry(item.category.clone()).or_default().push(item.clone());
                }
                Ok(SourcePayload {
                    source_id: source.id,
                    category_id: source.category_id,
                    fetch_id: fetch_id.to_string(),
                    data,
                })
            }
            Some(MockResponse::Fail(msg)) => Err(FetchError::Network(msg.clone())),
            None => Err(FetchError::Config(format!(
                "no scripted response for {}",
                source.name
            ))),
        }
    }
}

pub fn item(symbol: &str, category: &str, source: &str, price: &str) -> RawItem {
    RawItem {
        symbol: symbol.to_string(),
        category: category.to_string(),
        name: symbol.to_string(),
        source: source.to_string(),
        price: price.to_string(),
        change_percent: None,
        unit: "USD".to_string(),
    }
}

pub fn seed_source(name: &str, category: &str) -> SeedSource {
    SeedSource {
        name: name.to_string(),
        url: format!("http://{name}.test/latest"),
        category: category.to_string(),
        priority: 0,
        active: true,
        parser: SourceParser::CategoryArrays,
        timeout_ms: None,
        headers: HashMap::new(),
    }
}

pub fn seed_symbol(name: &str, category: &str) -> SeedSymbol {
    SeedSymbol {
        name: name.to_string(),
        category: category.to_string(),
        unit: "USD".to_string(),
        active: true,
    }
}

/// Three active sources and ten symbols across the four categories.
pub fn default_seed() -> CatalogSeed {
    CatalogSeed {
        categories: vec![
            "currency".into(),
            "gold".into(),
            "crypto".into(),
            "silver".into(),
        ],
        sources: vec![
            seed_source("alpha", "currency"),
            seed_source("beta", "gold"),
            seed_source("gamma", "crypto"),
        ],
        symbols: vec![
            seed_symbol("usd", "currency"),
            seed_symbol("eur", "currency"),
            seed_symbol("gbp", "currency"),
            seed_symbol("jpy", "currency"),
            seed_symbol("gold_oz", "gold"),
            seed_symbol("gold_gram", "gold"),
            seed_symbol("silver", "silver"),
            seed_symbol("btc", "crypto"),
            seed_symbol("eth", "crypto"),
            seed_symbol("doge", "crypto"),
        ],
    }
}

pub fn setup(fetcher: Arc<MockFetcher>) -> RateWatch {
    let rw = RateWatch::with_fetcher(":memory:", fetcher).unwrap();
    rw.seed(&default_seed()).unwrap();
    rw
}
