use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS data_sources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            url TEXT NOT NULL,
            category_id INTEGER NOT NULL REFERENCES categories(id),
            active INTEGER NOT NULL DEFAULT 1,
            priority INTEGER NOT NULL DEFAULT 0,
            parser TEXT NOT NULL DEFAULT 'category_arrays',
            timeout_ms INTEGER,
            headers TEXT
        );

        CREATE TABLE IF NOT EXISTS symbols (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            category_id INTEGER NOT NULL REFERENCES categories(id),
            unit TEXT NOT NULL DEFAULT 'USD',
            active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS prices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            symbol_id INTEGER NOT NULL REFERENCES symbols(id),
            price TEXT NOT NULL,
            change_percent TEXT,
            data_source_id INTEGER NOT NULL REFERENCES data_sources(id),
            fetch_id TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_prices_created ON prices(created_at);
        CREATE INDEX IF NOT EXISTS idx_prices_fetch ON prices(fetch_id);
        CREATE INDEX IF NOT EXISTS idx_sources_active ON data_sources(active);
        CREATE INDEX IF NOT EXISTS idx_symbols_active ON symbols(active);
        ",
    )
    .map_err(|e| format!("Migration failed: {e}"))
}
