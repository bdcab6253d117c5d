//! In-memory document store.
//!
//! Content is lost on restart. The mock variant is seeded with a single demo
//! document so a fresh process has something to edit.

use super::{DocumentStore, StoreError};
use crate::document::Document;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding one document with id `name`.
    pub fn mock(name: &str, content: &str) -> Self {
        let doc = Document {
            id: name.to_string(),
            title: "Demo".to_string(),
            description: "A demonstration document".to_string(),
            content: content.to_string(),
        };
        let store = Self::new();
        store.documents.write().insert(name.to_string(), doc);
        store
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, id: &str, doc: &Document) -> Result<(), StoreError> {
        let mut documents = self.documents.write();
        if documents.contains_key(id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        documents.insert(id.to_string(), doc.clone());
        Ok(())
    }

    async fn store(&self, id: &str, doc: &Document) -> Result<(), StoreError> {
        self.documents.write().insert(id.to_string(), doc.clone());
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<Document, StoreError> {
        self.documents
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_fetch() {
        let store = MemoryStore::new();
        let doc = Document::new("title", "desc", "hello");

        store.create(&doc.id, &doc).await.unwrap();
        assert_eq!(store.fetch(&doc.id).await.unwrap(), doc);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate() {
        let store = MemoryStore::new();
        let doc = Document::new("title", "desc", "hello");

        store.create(&doc.id, &doc).await.unwrap();
        let err = store.create(&doc.id, &doc).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_store_overwrites() {
        let store = MemoryStore::mock("demo", "before");
        let mut doc = store.fetch("demo").await.unwrap();
        doc.content = "after".to_string();

        store.store("demo", &doc).await.unwrap();
        assert_eq!(store.fetch("demo").await.unwrap().content, "after");
    }

    #[tokio::test]
    async fn test_fetch_missing() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.fetch("nope").await,
            Err(StoreError::NotFound(id)) if id == "nope"
        ));
    }
}
