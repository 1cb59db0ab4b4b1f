use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as Json;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::warn;

use domain::{Admin, InvitationCard, Invitee};

use super::{Collection, DocumentStore};
use crate::{Error, Result};

/// An entity that lives in one collection of the document store.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    /// Keys older documents may still carry that this shape no longer writes.
    /// They are nulled out on save so they cannot be read back stale.
    const RETIRED_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

impl Record for Admin {
    const COLLECTION: Collection = Collection::Admins;

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for InvitationCard {
    const COLLECTION: Collection = Collection::InvitationCards;

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Record for Invitee {
    const COLLECTION: Collection = Collection::Invitees;
    const RETIRED_FIELDS: &'static [&'static str] = &["paidAmount"];

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Typed view of one collection.
pub struct Repo<T> {
    store: Arc<dyn DocumentStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repo<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Repo<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Store a new entity; the returned copy carries the assigned id.
    pub async fn insert(&self, mut entity: T) -> Result<T> {
        let mut doc = serde_json::to_value(&entity)?;
        if let Some(map) = doc.as_object_mut() {
            map.remove("id");
        }
        let id = self.store.create(T::COLLECTION, doc).await?;
        entity.set_id(id);
        Ok(entity)
    }

    pub async fn get(&self, id: &str) -> Result<Option<T>> {
        match self.store.read(T::COLLECTION, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// Like [`Repo::get`], but a missing document is an error.
    pub async fn require(&self, id: &str) -> Result<T> {
        self.get(id)
            .await?
            .ok_or_else(|| Error::not_found(T::COLLECTION, id))
    }

    /// Overwrite every field of an existing document with `entity`.
    pub async fn save(&self, entity: &T) -> Result<()> {
        let mut doc = serde_json::to_value(entity)?;
        if let Some(map) = doc.as_object_mut() {
            for key in T::RETIRED_FIELDS {
                map.insert((*key).to_owned(), Json::Null);
            }
        }
        self.store.update(T::COLLECTION, entity.id(), doc).await
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        self.store.delete(T::COLLECTION, id).await
    }

    /// Every decodable document, in store order. Undecodable ones are
    /// logged and skipped.
    pub async fn all(&self) -> Result<Vec<T>> {
        let docs = self.store.list_all(T::COLLECTION).await?;
        let mut out = Vec::with_capacity(docs.len());
        for doc in docs {
            let id = doc
                .get("id")
                .and_then(Json::as_str)
                .unwrap_or("<no id>")
                .to_owned();
            match serde_json::from_value(doc) {
                Ok(entity) => out.push(entity),
                Err(e) => warn!("skipping undecodable {} document {}: {}", T::COLLECTION, id, e),
            }
        }
        Ok(out)
    }
}
