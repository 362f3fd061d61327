//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::StorageError;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Stored PDF files. Timestamps are milliseconds since the Unix epoch.
CREATE TABLE IF NOT EXISTS pdf_files (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    size INTEGER NOT NULL,
    created INTEGER NOT NULL,
    last_accessed INTEGER,
    data BLOB NOT NULL,
    thumbnail TEXT
);

CREATE INDEX IF NOT EXISTS idx_pdf_files_name ON pdf_files(name);
CREATE INDEX IF NOT EXISTS idx_pdf_files_size ON pdf_files(size);
CREATE INDEX IF NOT EXISTS idx_pdf_files_created ON pdf_files(created);
CREATE INDEX IF NOT EXISTS idx_pdf_files_last_accessed ON pdf_files(last_accessed);
"#;
