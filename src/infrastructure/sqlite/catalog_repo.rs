use crate::domain::entities::catalog::{Catalog, CatalogSeed, DataSource, SeedReport, Symbol};
use crate::domain::error::DomainError;
use crate::domain::ports::catalog_store::CatalogStore;
use log::warn;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const SOURCE_COLS: &str = "d.id, d.name, d.url, d.category_id, c.name, d.active, d.priority, d.parser, d.timeout_ms, d.headers";

pub struct SqliteCatalogRepo {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogRepo {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn row_to_source(row: &rusqlite::Row) -> Result<DataSource, rusqlite::Error> {
        let parser_str: String = row.get(7)?;
        let headers_str: Option<String> = row.get(9)?;
        let timeout_ms: Option<i64> = row.get(8)?;
        let active_int: i32 = row.get(5)?;

        Ok(DataSource {
            id: row.get(0)?,
            name: row.get(1)?,
            url: row.get(2)?,
            category_id: row.get(3)?,
            category: row.get(4)?,
            active: active_int != 0,
            priority: row.get(6)?,
            parser: parser_str.parse().unwrap_or_else(|_| {
                warn!("invalid parser '{parser_str}' on source, defaulting to category_arrays");
                Default::default()
            }),
            timeout_ms: timeout_ms.map(|t| t as u64),
            headers: headers_str
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or_default(),
        })
    }

    fn row_to_symbol(row: &rusqlite::Row) -> Result<Symbol, rusqlite::Error> {
        let active_int: i32 = row.get(4)?;
        Ok(Symbol {
            id: row.get(0)?,
            name: row.get(1)?,
            category_id: row.get(2)?,
            unit: row.get(3)?,
            active: active_int != 0,
        })
    }

    fn name_id_map(conn: &Connection, sql: &str) -> Result<HashMap<String, i64>, DomainError> {
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let map = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(map)
    }
}

impl CatalogStore for SqliteCatalogRepo {
    fn load_catalog(&self) -> Result<Catalog, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let sql = format!(
            "SELECT {SOURCE_COLS} FROM data_sources d JOIN categories c ON c.id = d.category_id
             WHERE d.active = 1 ORDER BY d.priority"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sources: Vec<DataSource> = stmt
            .query_map([], Self::row_to_source)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        let mut stmt = conn
            .prepare("SELECT id, name, category_id, unit, active FROM symbols WHERE active = 1")
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let symbols: Vec<Symbol> = stmt
            .query_map([], Self::row_to_symbol)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(Catalog { sources, symbols })
    }

    fn active_symbol_ids(&self) -> Result<HashMap<String, i64>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Self::name_id_map(&conn, "SELECT name, id FROM symbols WHERE active = 1")
    }

    fn active_source_ids(&self) -> Result<HashMap<String, i64>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Self::name_id_map(&conn, "SELECT name, id FROM data_sources WHERE active = 1")
    }

    fn list_sources(&self) -> Result<Vec<DataSource>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sql = format!(
            "SELECT {SOURCE_COLS} FROM data_sources d JOIN categories c ON c.id = d.category_id
             ORDER BY d.priority"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let sources = stmt
            .query_map([], Self::row_to_source)
            .map_err(|e| DomainError::Database(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(sources)
    }

    fn seed(&self, seed: &CatalogSeed) -> Result<SeedReport, DomainError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let mut report = SeedReport::default();

        for name in &seed.categories {
            tx.execute(
                "INSERT INTO categories (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
                params![name],
            )
            .map_err(|e| DomainError::Database(format!("Failed to seed category: {e}")))?;
            report.categories += 1;
        }

        let mut category_ids: HashMap<String, i64> = HashMap::new();
        {
            let mut stmt = tx
                .prepare("SELECT name, id FROM categories")
                .map_err(|e| DomainError::Database(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
                .map_err(|e| DomainError::Database(e.to_string()))?;
            for row in rows {
                let (name, id) = row.map_err(|e| DomainError::Database(e.to_string()))?;
                category_ids.insert(name, id);
            }
        }

        for source in &seed.sources {
            let category_id = category_ids.get(&source.category).ok_or_else(|| {
                DomainError::InvalidInput(format!(
                    "source '{}' references unknown category '{}'",
                    source.name, source.category
                ))
            })?;
            let headers = if source.headers.is_empty() {
                None
            } else {
                serde_json::to_string(&source.headers).ok()
            };
            tx.execute(
                "INSERT INTO data_sources (name, url, category_id, active, priority, parser, timeout_ms, headers)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(name) DO UPDATE SET
                    url = excluded.url, category_id = excluded.category_id,
                    active = excluded.active, priority = excluded.priority,
                    parser = excluded.parser, timeout_ms = excluded.timeout_ms,
                    headers = excluded.headers",
                params![
                    source.name,
                    source.url,
                    category_id,
                    source.active as i32,
                    source.priority,
                    source.parser.to_string(),
                    source.timeout_ms.map(|t| t as i64),
                    headers,
                ],
            )
            .map_err(|e| DomainError::Database(format!("Failed to seed source: {e}")))?;
            report.sources += 1;
        }

        for symbol in &seed.symbols {
            let category_id = category_ids.get(&symbol.category).ok_or_else(|| {
                DomainError::InvalidInput(format!(
                    "symbol '{}' references unknown category '{}'",
                    symbol.name, symbol.category
                ))
            })?;
            tx.execute(
                "INSERT INTO symbols (name, category_id, unit, active)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(name) DO UPDATE SET
                    category_id = excluded.category_id, unit = excluded.unit,
                    active = excluded.active",
                params![symbol.name, category_id, symbol.unit, symbol.active as i32],
            )
            .map_err(|e| DomainError::Database(format!("Failed to seed symbol: {e}")))?;
            report.symbols += 1;
        }

        tx.commit()
            .map_err(|e| DomainError::Database(e.to_string()))?;
        Ok(report)
    }
}
