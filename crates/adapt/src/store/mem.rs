use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value as Json;
use std::collections::HashMap;

use super::{Collection, DocumentStore, Documents};
use crate::Result;

/// Process-local store. Nothing survives a restart; used for tests and
/// throwaway runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<Collection, Documents>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with existing documents (each should carry an `id`).
    pub fn with_documents(self, collection: Collection, docs: Vec<Json>) -> Self {
        self.collections
            .write()
            .insert(collection, Documents::from_vec(docs));
        self
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .get(&collection)
            .map_or(0, |d| d.as_slice().len())
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create(&self, collection: Collection, record: Json) -> Result<String> {
        self.collections
            .write()
            .entry(collection)
            .or_default()
            .insert(collection, record)
    }

    async fn read(&self, collection: Collection, id: &str) -> Result<Option<Json>> {
        Ok(self
            .collections
            .read()
            .get(&collection)
            .and_then(|d| d.get(id))
            .cloned())
    }

    async fn update(&self, collection: Collection, id: &str, partial: Json) -> Result<()> {
        self.collections
            .write()
            .entry(collection)
            .or_default()
            .merge(collection, id, partial)
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        if let Some(docs) = self.collections.write().get_mut(&collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn list_all(&self, collection: Collection) -> Result<Vec<Json>> {
        Ok(self
            .collections
            .read()
            .get(&collection)
            .map(|d| d.as_slice().to_vec())
            .unwrap_or_default())
    }
}
