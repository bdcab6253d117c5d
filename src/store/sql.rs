//! SQLite document store.
//!
//! Uses a SQLx connection pool and the embedded migrations under
//! `migrations/`.

use super::{DocumentStore, StoreError, check_id};
use crate::document::Document;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    /// Connection acquire timeout - prevents connection storms from blocking indefinitely.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connect to the database at `path`, running migrations if needed.
    ///
    /// `:memory:` opens a private in-memory database.
    pub async fn connect(path: &str) -> Result<Self, StoreError> {
        let (options, max_connections) = if path == ":memory:" {
            // Uniquely named shared-cache database so parallel tests never collide.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let uri = format!(
                "file:scribed-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );
            let options = SqliteConnectOptions::new()
                .filename(&uri)
                .shared_cache(true)
                .create_if_missing(true);
            (options, 1)
        } else {
            if let Some(parent) = Path::new(path).parent()
                && !parent.as_os_str().is_empty()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
            }
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true);
            (options, 5)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Self::ACQUIRE_TIMEOUT)
            .idle_timeout(Some(Self::IDLE_TIMEOUT))
            .test_before_acquire(true)
            .connect_with(options)
            .await?;

        info!(path = %path, "Database connected");

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations checked/applied");

        if path != ":memory:" {
            sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Get reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for SqlStore {
    async fn create(&self, id: &str, doc: &Document) -> Result<(), StoreError> {
        check_id(id)?;
        let result = sqlx::query(
            "INSERT INTO documents (id, title, description, content, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&doc.title)
        .bind(&doc.description)
        .bind(&doc.content)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::AlreadyExists(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, id: &str, doc: &Document) -> Result<(), StoreError> {
        check_id(id)?;
        sqlx::query(
            "INSERT INTO documents (id, title, description, content, updated_at) VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET title = excluded.title, description = excluded.description, \
             content = excluded.content, updated_at = excluded.updated_at",
        )
        .bind(id)
        .bind(&doc.title)
        .bind(&doc.description)
        .bind(&doc.content)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Document, StoreError> {
        check_id(id)?;
        let row: Option<(String, String, String)> =
            sqlx::query_as("SELECT title, description, content FROM documents WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let (title, description, content) =
            row.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(Document {
            id: id.to_string(),
            title,
            description,
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_database_roundtrip() {
        let store = SqlStore::connect(":memory:").await.unwrap();
        let mut doc = Document::new("title", "desc", "hello");

        store.create(&doc.id, &doc).await.unwrap();
        doc.content = "hello world".to_string();
        store.store(&doc.id, &doc).await.unwrap();

        assert_eq!(store.fetch(&doc.id).await.unwrap(), doc);
    }

    #[tokio::test]
    async fn test_duplicate_create_rejected() {
        let store = SqlStore::connect(":memory:").await.unwrap();
        let doc = Document::new("title", "desc", "hello");

        store.create(&doc.id, &doc).await.unwrap();
        assert!(matches!(
            store.create(&doc.id, &doc).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.db").display().to_string();
        let doc = Document::new("title", "desc", "persisted");

        {
            let store = SqlStore::connect(&path).await.unwrap();
            store.create(&doc.id, &doc).await.unwrap();
            store.pool().close().await;
        }

        let store = SqlStore::connect(&path).await.unwrap();
        assert_eq!(store.fetch(&doc.id).await.unwrap().content, "persisted");
        assert!(matches!(store.fetch("missing").await, Err(StoreError::NotFound(_))));
    }
}
