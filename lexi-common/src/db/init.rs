//! Database initialization
//!
//! Creates the enrichment cache tables and the word tables they are read
//! against. Every statement is idempotent, so opening an existing database
//! is the same code path as creating a new one.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Busy timeout applied to every connection, before lock retries kick in
const BUSY_TIMEOUT_MS: u32 = 250;

/// Open (or create) the database at `db_path` and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets enrichment reads proceed while a write-back holds the writer lock
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    apply_connection_pragmas(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the full schema
///
/// An in-memory SQLite database is private to its connection, so the pool is
/// capped at one connection to keep every query on the same data.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    apply_connection_pragmas(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

async fn apply_connection_pragmas(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    let pragma_sql = format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS);
    sqlx::query(&pragma_sql).execute(pool).await?;

    Ok(())
}

/// Create all tables and indexes if they do not exist
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_word_tables(pool).await?;
    create_outer_source_tables(pool).await?;
    Ok(())
}

/// Word tables owned by the vocabulary application
///
/// The enrichment engine reads a word's authored facets from here and the
/// example cache cleanup compares cached origins against `word_examples`.
async fn create_word_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS words (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS word_transcriptions (
            word_id TEXT NOT NULL REFERENCES words(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            value TEXT NOT NULL,
            note TEXT,
            PRIMARY KEY (word_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS word_interpretations (
            word_id TEXT NOT NULL REFERENCES words(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (word_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS word_translations (
            word_id TEXT NOT NULL REFERENCES words(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            value TEXT NOT NULL,
            note TEXT,
            PRIMARY KEY (word_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS word_examples (
            word_id TEXT NOT NULL REFERENCES words(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            origin TEXT NOT NULL COLLATE NOCASE,
            translate TEXT,
            note TEXT,
            PRIMARY KEY (word_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_word_examples_origin ON word_examples(origin)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Enrichment cache tables
///
/// Shared facets are keyed by the normalized word value, examples by word id.
/// No foreign keys: the cache outlives the rows it was fetched for and is
/// cleaned separately.
async fn create_outer_source_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS outer_source_transcriptions (
            word_value TEXT NOT NULL,
            value TEXT NOT NULL,
            note TEXT,
            source_name TEXT NOT NULL,
            source_url TEXT NOT NULL,
            recent_update_date TEXT NOT NULL,
            PRIMARY KEY (word_value, value, source_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS outer_source_interpretations (
            word_value TEXT NOT NULL,
            value TEXT NOT NULL,
            source_name TEXT NOT NULL,
            source_url TEXT NOT NULL,
            recent_update_date TEXT NOT NULL,
            PRIMARY KEY (word_value, value, source_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS outer_source_translations (
            word_value TEXT NOT NULL,
            value TEXT NOT NULL,
            note TEXT,
            source_name TEXT NOT NULL,
            source_url TEXT NOT NULL,
            recent_update_date TEXT NOT NULL,
            PRIMARY KEY (word_value, value, source_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS outer_source_examples (
            word_id TEXT NOT NULL,
            origin TEXT NOT NULL COLLATE NOCASE,
            source_name TEXT NOT NULL,
            translate TEXT NOT NULL,
            source_url TEXT NOT NULL,
            recent_update_date TEXT NOT NULL,
            PRIMARY KEY (word_id, origin, source_name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_outer_source_examples_origin ON outer_source_examples(origin)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_schema_created() {
        let pool = init_in_memory().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        for expected in [
            "outer_source_examples",
            "outer_source_interpretations",
            "outer_source_transcriptions",
            "outer_source_translations",
            "word_examples",
            "words",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }
    }

    #[tokio::test]
    async fn test_create_schema_is_idempotent() {
        let pool = init_in_memory().await.unwrap();
        create_schema(&pool).await.unwrap();
        create_schema(&pool).await.unwrap();
    }
}
