//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the spider-index database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per crawled URL
CREATE TABLE IF NOT EXISTS documents (
    url TEXT PRIMARY KEY,
    crawled_on TEXT NOT NULL,
    token_index TEXT NOT NULL DEFAULT '{}',
    refs TEXT NOT NULL DEFAULT '[]'
);

-- Ordered outbound links (the `seen` list) of each document
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_url TEXT NOT NULL REFERENCES documents(url) ON DELETE CASCADE,
    to_url TEXT NOT NULL,
    position INTEGER NOT NULL,
    UNIQUE(from_url, to_url)
);

CREATE INDEX IF NOT EXISTS idx_links_from ON links(from_url);
CREATE INDEX IF NOT EXISTS idx_links_to ON links(to_url);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
