//! Document persistence.
//!
//! A [`DocumentStore`] is the only way document content leaves the process.
//! Backends:
//! - [`MemoryStore`]: process memory, optionally seeded with a demo document
//! - [`FileStore`]: one JSON file per document
//! - [`SqlStore`]: SQLite via SQLx with embedded migrations

mod file;
mod memory;
mod sql;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sql::SqlStore;

use crate::config::{StoreConfig, StoreKind};
use crate::document::Document;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("document already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid document id: {0}")]
    InvalidId(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidId(_) => "invalid_document_id",
            Self::Io(_) => "storage_io",
            Self::Serialization(_) => "storage_serialization",
            Self::Database(_) | Self::Migration(_) => "storage_database",
        }
    }
}

/// Persistence backend for documents.
///
/// Implementations are shared between every document actor and must be safe
/// to call concurrently for different ids.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist a brand new document, failing if the id is taken.
    async fn create(&self, id: &str, doc: &Document) -> Result<(), StoreError>;

    /// Overwrite the stored copy of a document.
    async fn store(&self, id: &str, doc: &Document) -> Result<(), StoreError>;

    /// Load a document.
    async fn fetch(&self, id: &str) -> Result<Document, StoreError>;
}

/// Build the store selected by `config`.
pub async fn from_config(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    let store: Arc<dyn DocumentStore> = match config.kind {
        StoreKind::Memory => Arc::new(MemoryStore::new()),
        StoreKind::Mock => Arc::new(MemoryStore::mock(&config.name, &config.mock_content)),
        StoreKind::File => Arc::new(FileStore::open(&config.directory).await?),
        StoreKind::Sqlite => Arc::new(SqlStore::connect(&config.path).await?),
    };
    info!(kind = ?config.kind, "Document store ready");
    Ok(store)
}

fn check_id(id: &str) -> Result<(), StoreError> {
    crate::document::validate_id(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}
