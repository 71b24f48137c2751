mod common;

use common::{default_seed, item, seed_source, setup, MockFetcher};
use ratewatch::application::orchestrator::FetchOrchestrator;
use ratewatch::application::persister::Persister;
use ratewatch::domain::entities::catalog::CatalogSeed;
use ratewatch::domain::entities::price_record::PriceRecord;
use ratewatch::domain::error::DomainError;
use ratewatch::domain::ports::catalog_store::CatalogStore;
use ratewatch::domain::ports::price_store::{AggregatedView, PriceStats, PriceStore};
use ratewatch::domain::values::trigger::TriggerType;
use ratewatch::infrastructure::sqlite::catalog_repo::SqliteCatalogRepo;
use ratewatch::infrastructure::sqlite::migrations::run_migrations;
use ratewatch::RateWatch;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, RwLock};

#[tokio::test]
async fn test_all_sources_succeed() {
    let fetcher = MockFetcher::new();
    fetcher.succeed(
        "alpha",
        vec![
            item("usd", "currency", "alpha", "42,000"),
            item("eur", "currency", "alpha", "45,100.5"),
            item("gbp", "currency", "alpha", "53,200"),
            item("jpy", "currency", "alpha", "280.75"),
        ],
    );
    fetcher.succeed(
        "beta",
        vec![
            item("gold_oz", "gold", "beta", "2,400.10"),
            item("gold_gram", "gold", "beta", "77.2"),
            item("silver", "silver", "beta", "31.5"),
        ],
    );
    fetcher.succeed(
        "gamma",
        vec![
            item("btc", "crypto", "gamma", "98,500"),
            item("eth", "crypto", "gamma", "3,900"),
            item("doge", "crypto", "gamma", "0.41"),
        ],
    );
    let rw = setup(fetcher);

    let summary = rw.run_fetch(TriggerType::Manual).await.unwrap();
    assert!(summary.success);
    assert_eq!(summary.records_stored, 10);
    assert_eq!(summary.sources_failed, 0);
    assert_eq!(summary.sources_total, 3);
    assert!(summary.error.is_none());
    assert_eq!(rw.count_by_fetch_id(&summary.fetch_id).unwrap(), 10);
}

#[tokio::test]
async fn test_majority_failure_aborts_without_writing() {
    let fetcher = MockFetcher::new();
    fetcher.fail("alpha", "timeout");
    fetcher.fail("beta", "connection refused");
    fetcher.succeed("gamma", vec![item("btc", "crypto", "gamma", "98500")]);
    let rw = setup(fetcher);

    let summary = rw.run_fetch(TriggerType::Scheduled).await.unwrap();
    assert!(!summary.success);
    assert_eq!(summary.records_stored, 0);
    assert_eq!(summary.sources_failed, 2);
    assert_eq!(summary.sources_total, 3);
    assert_eq!(
        summary.error.as_deref(),
        Some("more than half of sources failed")
    );
    // Nothing tagged with this run's correlation id may exist.
    assert_eq!(rw.count_by_fetch_id(&summary.fetch_id).unwrap(), 0);
}

#[tokio::test]
async fn test_minority_failure_is_absorbed() {
    let fetcher = MockFetcher::new();
    fetcher.fail("alpha", "timeout");
    fetcher.succeed(
        "beta",
        vec![
            item("gold_oz", "gold", "beta", "2400"),
            item("gold_gram", "gold", "beta", "77.2"),
            item("silver", "silver", "beta", "31.5"),
        ],
    );
    fetcher.succeed(
        "gamma",
        vec![
            item("btc", "crypto", "gamma", "98500"),
            item("eth", "crypto", "gamma", "3900"),
        ],
    );
    let rw = setup(fetcher);

    let summary = rw.run_fetch(TriggerType::Scheduled).await.unwrap();
    assert!(summary.success);
    assert_eq!(summary.records_stored, 5);
    assert_eq!(summary.sources_failed, 1);
    // A minority outage is a missing contribution, not a run error.
    assert!(summary.error.is_none());
}

#[tokio::test]
async fn test_exactly_half_failed_proceeds() {
    let fetcher = MockFetcher::new();
    fetcher.fail("alpha", "timeout");
    fetcher.fail("beta", "500");
    fetcher.succeed("gamma", vec![item("btc", "crypto", "gamma", "98500")]);
    fetcher.succeed("delta", vec![item("silver", "silver", "delta", "31.5")]);
    let rw = setup(fetcher);
    // Fourth active source: 2/4 failed is not a strict majority.
    rw.seed(&CatalogSeed {
        categories: vec!["silver".into()],
        sources: vec![seed_source("delta", "silver")],
        symbols: vec![],
    })
    .unwrap();

    let summary = rw.run_fetch(TriggerType::Manual).await.unwrap();
    assert!(summary.success);
    assert_eq!(summary.sources_total, 4);
    assert_eq!(summary.sources_failed, 2);
    assert_eq!(summary.records_stored, 2);
}

#[tokio::test]
async fn test_unknown_symbol_dropped_siblings_stored() {
    let fetcher = MockFetcher::new();
    fetcher.succeed(
        "alpha",
        vec![
            item("usd", "currency", "alpha", "42000"),
            item("ghost", "currency", "alpha", "1.0"),
            item("eur", "currency", "alpha", "45100"),
        ],
    );
    fetcher.succeed("beta", vec![item("gold_oz", "gold", "beta", "2400")]);
    fetcher.succeed("gamma", vec![item("btc", "crypto", "gamma", "98500")]);
    let rw = setup(fetcher);

    let summary = rw.run_fetch(TriggerType::Manual).await.unwrap();
    assert!(summary.success);
    assert_eq!(summary.records_stored, 4);
}

#[tokio::test]
async fn test_zero_valid_records_is_unsuccessful_but_not_fatal() {
    let fetcher = MockFetcher::new();
    fetcher.succeed("alpha", vec![item("usd", "currency", "alpha", "not-a-price")]);
    fetcher.succeed("beta", vec![]);
    fetcher.succeed("gamma", vec![]);
    let rw = setup(fetcher);

    let summary = rw.run_fetch(TriggerType::Manual).await.unwrap();
    assert!(!summary.success);
    assert_eq!(summary.records_stored, 0);
    assert!(summary.error.is_none());
}

#[tokio::test]
async fn test_empty_catalog_is_a_precondition_error() {
    let rw = RateWatch::with_fetcher(":memory:", MockFetcher::new()).unwrap();
    let err = rw.run_fetch(TriggerType::Manual).await.unwrap_err();
    assert!(matches!(err, DomainError::Precondition(_)));
}

#[tokio::test]
async fn test_runs_get_distinct_fetch_ids() {
    let fetcher = MockFetcher::new();
    fetcher.succeed("alpha", vec![item("usd", "currency", "alpha", "42000")]);
    fetcher.succeed("beta", vec![item("gold_oz", "gold", "beta", "2400")]);
    fetcher.succeed("gamma", vec![item("btc", "crypto", "gamma", "98500")]);
    let rw = setup(fetcher);

    let first = rw.run_fetch(TriggerType::Scheduled).await.unwrap();
    let second = rw.run_fetch(TriggerType::Manual).await.unwrap();
    assert_ne!(first.fetch_id, second.fetch_id);
    assert_eq!(rw.count_by_fetch_id(&first.fetch_id).unwrap(), 3);
    assert_eq!(rw.count_by_fetch_id(&second.fetch_id).unwrap(), 3);
}

/// Price store whose writes always fail, standing in for a broken disk.
struct FailingPriceStore;

impl PriceStore for FailingPriceStore {
    fn insert_batch(&self, _records: &[PriceRecord]) -> Result<usize, DomainError> {
        Err(DomainError::Database("disk full".into()))
    }

    fn latest_day_view(&self) -> Result<Option<AggregatedView>, DomainError> {
        Ok(None)
    }

    fn count_by_fetch_id(&self, _fetch_id: &str) -> Result<usize, DomainError> {
        Ok(0)
    }

    fn stats(&self) -> Result<PriceStats, DomainError> {
        Ok(PriceStats::default())
    }
}

#[tokio::test]
async fn test_persistence_failure_becomes_failed_summary() {
    let fetcher = MockFetcher::new();
    fetcher.succeed("alpha", vec![item("usd", "currency", "alpha", "42000")]);
    fetcher.succeed("beta", vec![item("gold_oz", "gold", "beta", "2400")]);
    fetcher.succeed("gamma", vec![item("btc", "crypto", "gamma", "98500")]);

    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    run_migrations(&conn).unwrap();
    let catalog_repo = Arc::new(SqliteCatalogRepo::new(Arc::new(Mutex::new(conn))));
    catalog_repo.seed(&default_seed()).unwrap();
    let snapshot = Arc::new(RwLock::new(Some(Arc::new(
        catalog_repo.load_catalog().unwrap(),
    ))));
    let persister = Persister::new(catalog_repo, Arc::new(FailingPriceStore));
    let orchestrator = FetchOrchestrator::new(snapshot, fetcher, persister);

    // A failed write is caught into the summary, never an Err to the caller.
    let summary = orchestrator.run_fetch(TriggerType::Manual).await.unwrap();
    assert!(!summary.success);
    assert_eq!(summary.records_stored, 0);
    assert_eq!(summary.sources_failed, 0);
    assert!(summary.error.as_deref().unwrap().contains("disk full"));
}

#[tokio::test]
async fn test_deactivated_source_is_not_fetched() {
    let fetcher = MockFetcher::new();
    // No script for alpha: fetching it would fail the run below.
    fetcher.succeed("beta", vec![item("gold_oz", "gold", "beta", "2400")]);
    fetcher.succeed("gamma", vec![item("btc", "crypto", "gamma", "98500")]);
    let rw = setup(fetcher);

    let mut deactivate = default_seed();
    deactivate.sources[0].active = false;
    deactivate.symbols.clear();
    rw.seed(&deactivate).unwrap();

    let summary = rw.run_fetch(TriggerType::Manual).await.unwrap();
    assert!(summary.success);
    assert_eq!(summary.sources_total, 2);
    assert_eq!(summary.sources_failed, 0);
    assert_eq!(summary.records_stored, 2);
}
