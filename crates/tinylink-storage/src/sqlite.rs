use async_trait::async_trait;
use jiff::Timestamp;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tinylink_core::error::{DuplicateKey, StorageError};
use tinylink_core::repository::{ReadRepository, Repository, Result, ShortLink};
use tinylink_core::short_id::ShortId;
use tracing::info;

/// DDL for the `short_links` table. Idempotent.
pub const SCHEMA: &str = include_str!("../ddl/sqlite/short_links.sql");

/// SQLite implementation of the repository contract.
///
/// Both unique keys are enforced by table constraints, so a concurrent
/// writer can never slip a duplicate past an application-level pre-check.
/// The surrogate `id` column stays internal to this backend.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a repository from an existing SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new SQLite connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Opens a private in-memory database.
    ///
    /// Every connection to `sqlite::memory:` sees its own database, so the
    /// pool is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(map_sqlx_error)?;
        let repo = Self::new(pool);
        repo.migrate().await?;
        Ok(repo)
    }

    /// Creates the `short_links` table if it does not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        info!("short_links schema ready");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn parse_created_at(seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", seconds))
    })
}

fn row_to_link(row: &SqliteRow) -> Result<ShortLink> {
    let short_id: String = row.try_get("short_id").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

    Ok(ShortLink {
        short_id: ShortId::new_unchecked(short_id),
        original_url,
        created_at: parse_created_at(created_at)?,
    })
}

/// Maps a unique violation to the key it was raised for.
///
/// SQLite names the offending column in the message, e.g.
/// `UNIQUE constraint failed: short_links.original_url`.
fn duplicate_key(err: &sqlx::Error, link: &ShortLink) -> Option<DuplicateKey> {
    let db_err = err.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }

    if db_err.message().contains("short_links.original_url") {
        Some(DuplicateKey::OriginalUrl(link.original_url.clone()))
    } else {
        Some(DuplicateKey::ShortId(link.short_id.to_string()))
    }
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for SqliteRepository {
    async fn find_by_short_id(&self, short_id: &ShortId) -> Result<Option<ShortLink>> {
        let row = sqlx::query(
            r#"
            SELECT short_id, original_url, created_at
            FROM short_links
            WHERE short_id = ?
            LIMIT 1
            "#,
        )
        .bind(short_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_link).transpose()
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortLink>> {
        let row = sqlx::query(
            r#"
            SELECT short_id, original_url, created_at
            FROM short_links
            WHERE original_url = ?
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_link).transpose()
    }

    async fn exists_by_short_id(&self, short_id: &ShortId) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM short_links
            WHERE short_id = ?
            LIMIT 1
            "#,
        )
        .bind(short_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn insert_unique(&self, link: ShortLink) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO short_links (short_id, original_url, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(link.short_id.as_str())
        .bind(link.original_url.as_str())
        .bind(link.created_at.as_second())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) => match duplicate_key(&err, &link) {
                Some(key) => Err(StorageError::Duplicate(key)),
                None => Err(map_sqlx_error(err)),
            },
        }
    }
}
