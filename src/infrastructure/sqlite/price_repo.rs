use crate::domain::entities::price_record::PriceRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::price_store::{
    AggregatedView, PriceStats, PriceStore, ViewItem, ViewMeta,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use rusqlite::{params, Connection};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

pub struct SqlitePriceRepo {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePriceRepo {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

// A stored timestamp that no longer parses must not masquerade as a fresh
// one; the freshness gate would treat corrupt rows as just fetched.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::Parse(format!("stored timestamp '{raw}': {e}")))
}

impl PriceStore for SqlitePriceRepo {
    fn insert_batch(&self, records: &[PriceRecord]) -> Result<usize, DomainError> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;

        // One transaction for the whole batch. Any failure drops the
        // transaction and rolls everything back; a partial batch is never
        // committed.
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO prices (symbol_id, price, change_percent, data_source_id, fetch_id, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(|e| DomainError::Database(e.to_string()))?;
            for record in records {
                stmt.execute(params![
                    record.symbol_id,
                    record.price.to_string(),
                    record.change_percent.map(|c| c.to_string()),
                    record.data_source_id,
                    record.fetch_id,
                    record.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                ])
                .map_err(|e| DomainError::Database(format!("Failed to insert price: {e}")))?;
            }
        }
        tx.commit()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(records.len())
    }

    fn latest_day_view(&self) -> Result<Option<AggregatedView>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT c.name, s.name, p.price, p.change_percent, s.unit, d.name, p.created_at
                 FROM prices p
                 JOIN symbols s ON s.id = p.symbol_id
                 JOIN categories c ON c.id = s.category_id
                 JOIN data_sources d ON d.id = p.data_source_id
                 WHERE date(p.created_at) = (SELECT date(MAX(created_at)) FROM prices)
                 ORDER BY p.created_at ASC",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?;

        // Rows come oldest-first, so a later observation of the same symbol
        // supersedes an earlier one.
        let mut latest: BTreeMap<String, BTreeMap<String, ViewItem>> = BTreeMap::new();
        let mut fetched_at: Option<DateTime<Utc>> = None;
        let mut source_names: BTreeSet<String> = BTreeSet::new();

        for row in rows {
            let (category, symbol, price, change_percent, unit, source, created_at) =
                row.map_err(|e| DomainError::Database(e.to_string()))?;
            let price = Decimal::from_str(&price)
                .map_err(|e| DomainError::Parse(format!("stored price '{price}': {e}")))?;
            let change_percent = match change_percent {
                None => None,
                Some(raw) => Some(
                    Decimal::from_str(&raw)
                        .map_err(|e| DomainError::Parse(format!("stored change '{raw}': {e}")))?,
                ),
            };
            let ts = parse_timestamp(&created_at)?;
            if fetched_at.map_or(true, |cur| ts > cur) {
                fetched_at = Some(ts);
            }
            source_names.insert(source);
            latest.entry(category).or_default().insert(
                symbol.clone(),
                ViewItem {
                    symbol,
                    price,
                    change_percent,
                    unit,
                },
            );
        }

        let Some(fetched_at) = fetched_at else {
            return Ok(None);
        };

        let data = latest
            .into_iter()
            .map(|(category, by_symbol)| (category, by_symbol.into_values().collect()))
            .collect();

        Ok(Some(AggregatedView {
            data,
            meta: ViewMeta {
                fetched_at,
                source_names: source_names.into_iter().collect(),
            },
        }))
    }

    fn count_by_fetch_id(&self, fetch_id: &str) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        conn.query_row(
            "SELECT COUNT(*) FROM prices WHERE fetch_id = ?1",
            params![fetch_id],
            |r| r.get(0),
        )
        .map_err(|e| DomainError::Database(e.to_string()))
    }

    fn stats(&self) -> Result<PriceStats, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let total_records: usize = conn
            .query_row("SELECT COUNT(*) FROM prices", [], |r| r.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let fetch_runs: usize = conn
            .query_row("SELECT COUNT(DISTINCT fetch_id) FROM prices", [], |r| {
                r.get(0)
            })
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT c.name, COUNT(*) FROM prices p
                 JOIN symbols s ON s.id = p.symbol_id
                 JOIN categories c ON c.id = s.category_id
                 GROUP BY c.name ORDER BY c.name",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let by_category: Vec<(String, usize)> = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
            })
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        let latest: Option<String> = conn
            .query_row("SELECT MAX(created_at) FROM prices", [], |r| r.get(0))
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(PriceStats {
            total_records,
            by_category,
            fetch_runs,
            latest_created_at: latest.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}
