//! File-backed document store.
//!
//! Each document is written as `<id>.json` inside the configured directory.
//! Writes go to a temporary file first and are renamed into place.

use super::{DocumentStore, StoreError, check_id};
use crate::document::Document;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `directory`, creating it if missing.
    pub async fn open(directory: impl AsRef<Path>) -> Result<Self, StoreError> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory).await?;
        info!(directory = %directory.display(), "File store opened");
        Ok(Self { directory })
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        check_id(id)?;
        Ok(self.directory.join(format!("{id}.json")))
    }

    async fn write(&self, path: &Path, doc: &Document) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(doc)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn create(&self, id: &str, doc: &Document) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        let body = serde_json::to_vec_pretty(doc)?;

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(&body).await?;
        file.flush().await?;
        Ok(())
    }

    async fn store(&self, id: &str, doc: &Document) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        self.write(&path, doc).await
    }

    async fn fetch(&self, id: &str) -> Result<Document, StoreError> {
        let path = self.path_for(id)?;
        let body = match fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut doc: Document = serde_json::from_slice(&body)?;
        doc.id = id.to_string();
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let mut doc = Document::new("title", "desc", "héllo wörld");

        store.create(&doc.id, &doc).await.unwrap();
        doc.content.push_str("!");
        store.store(&doc.id, &doc).await.unwrap();

        let reopened = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.fetch(&doc.id).await.unwrap(), doc);
        assert!(dir.path().join(format!("{}.json", doc.id)).exists());
    }

    #[tokio::test]
    async fn test_create_existing_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let doc = Document::new("title", "desc", "x");

        store.create(&doc.id, &doc).await.unwrap();
        assert!(matches!(
            store.create(&doc.id, &doc).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_missing_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        assert!(matches!(store.fetch("absent").await, Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.fetch("../escape").await,
            Err(StoreError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("broken.json"), b"{not json").unwrap();

        assert!(matches!(
            store.fetch("broken").await,
            Err(StoreError::Serialization(_))
        ));
    }
}
