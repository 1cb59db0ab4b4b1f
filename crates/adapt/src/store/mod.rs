//! Document-store port.
//!
//! Records are schemaless JSON objects grouped into named collections. The
//! port knows nothing about invitees or cards; [`repo::Repo`] layers the
//! typed view on top.

pub mod json;
pub mod mem;
pub mod repo;

use async_trait::async_trait;
use serde_json::{Map, Value as Json};
use std::fmt;
use uuid::Uuid;

use crate::{Error, Result};

pub use json::JsonFileStore;
pub use mem::InMemoryStore;
pub use repo::{Record, Repo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Admins,
    InvitationCards,
    Invitees,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Admins,
        Collection::InvitationCards,
        Collection::Invitees,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Admins => "admins",
            Collection::InvitationCards => "invitation-cards",
            Collection::Invitees => "invitees",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store `record` under a freshly generated id, which is also written
    /// into the record's `id` field. Returns the id.
    async fn create(&self, collection: Collection, record: Json) -> Result<String>;

    async fn read(&self, collection: Collection, id: &str) -> Result<Option<Json>>;

    /// Shallow merge of the top-level fields of `partial` into an existing
    /// document. `id` is never overwritten.
    async fn update(&self, collection: Collection, id: &str, partial: Json) -> Result<()>;

    /// Succeeds whether or not the document existed.
    async fn delete(&self, collection: Collection, id: &str) -> Result<()>;

    async fn list_all(&self, collection: Collection) -> Result<Vec<Json>>;
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Document list shared by the backends
// ─────────────────────────────────────────────────────────────────────────────

/// One collection's documents in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Documents(Vec<Json>);

fn id_of(doc: &Json) -> Option<&str> {
    doc.get("id").and_then(Json::as_str)
}

fn into_object(collection: Collection, record: Json) -> Result<Map<String, Json>> {
    match record {
        Json::Object(map) => Ok(map),
        other => Err(Error::store(format!(
            "{collection}: expected a JSON object, got {other}"
        ))),
    }
}

impl Documents {
    pub(crate) fn from_vec(docs: Vec<Json>) -> Self {
        Self(docs)
    }

    pub(crate) fn as_slice(&self) -> &[Json] {
        &self.0
    }

    pub(crate) fn insert(&mut self, collection: Collection, record: Json) -> Result<String> {
        let mut map = into_object(collection, record)?;
        let id = new_id();
        map.insert("id".to_owned(), Json::String(id.clone()));
        self.0.push(Json::Object(map));
        Ok(id)
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Json> {
        self.0.iter().find(|d| id_of(d) == Some(id))
    }

    pub(crate) fn merge(&mut self, collection: Collection, id: &str, partial: Json) -> Result<()> {
        let partial = into_object(collection, partial)?;
        let doc = self
            .0
            .iter_mut()
            .find(|d| id_of(d) == Some(id))
            .ok_or_else(|| Error::not_found(collection, id))?;
        let Json::Object(target) = doc else {
            return Err(Error::store(format!("{collection}: document '{id}' is not an object")));
        };
        for (key, value) in partial {
            if key != "id" {
                target.insert(key, value);
            }
        }
        Ok(())
    }

    /// Whether anything was removed.
    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|d| id_of(d) != Some(id));
        self.0.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collection_names_match_stored_files() {
        let names: Vec<_> = Collection::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, ["admins", "invitation-cards", "invitees"]);
    }

    #[test]
    fn insert_injects_fresh_id() {
        let mut docs = Documents::default();
        let a = docs
            .insert(Collection::Invitees, json!({ "id": "", "name": "Asha" }))
            .unwrap();
        let b = docs
            .insert(Collection::Invitees, json!({ "name": "Juma" }))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(docs.get(&a).unwrap()["name"], "Asha");
        assert_eq!(docs.get(&b).unwrap()["id"], json!(b));
    }

    #[test]
    fn merge_is_shallow_and_keeps_id() {
        let mut docs = Documents::default();
        let id = docs
            .insert(
                Collection::Invitees,
                json!({ "name": "Asha", "phone": "0712345678", "nested": { "a": 1, "b": 2 } }),
            )
            .unwrap();

        docs.merge(
            Collection::Invitees,
            &id,
            json!({ "id": "hijack", "phone": "0799999999", "nested": { "a": 3 } }),
        )
        .unwrap();

        let doc = docs.get(&id).unwrap();
        assert_eq!(doc["id"], json!(id));
        assert_eq!(doc["name"], "Asha");
        assert_eq!(doc["phone"], "0799999999");
        assert_eq!(doc["nested"], json!({ "a": 3 }));
    }

    #[test]
    fn merge_into_missing_is_not_found() {
        let mut docs = Documents::default();
        let err = docs
            .merge(Collection::Admins, "nope", json!({ "name": "x" }))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn non_objects_are_rejected() {
        let mut docs = Documents::default();
        assert!(matches!(
            docs.insert(Collection::Admins, json!([1, 2])),
            Err(Error::Store(_))
        ));
    }

    #[test]
    fn remove_reports_whether_anything_went() {
        let mut docs = Documents::default();
        let id = docs.insert(Collection::Admins, json!({})).unwrap();
        assert!(docs.remove(&id));
        assert!(!docs.remove(&id));
    }
}
