//! Realtime document store
//!
//! A small key/value document model: named collections of JSON object
//! documents with get/set/batch semantics and live subscriptions that
//! deliver whole-collection snapshots. `MemoryStore` keeps everything in
//! process; `FileStore` persists it to a JSON file in the data directory.

pub mod error;
pub mod file;
pub mod memory;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Every document in a collection at one point in time, ordered by id
pub type Snapshot = BTreeMap<String, Value>;

/// Slash-separated path naming a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Shared problem catalog for a deployment
    pub fn catalog(app_id: &str) -> Self {
        Self(format!("artifacts/{app_id}/public/data/dsa_problems"))
    }

    /// Progress records owned by one user
    pub fn progress(app_id: &str, user_id: &str) -> Self {
        Self(format!("artifacts/{app_id}/users/{user_id}/progress"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How `set` treats fields already stored in the document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Overwrite the whole document
    #[default]
    Replace,
    /// Merge fields into the stored document, leaving absent fields untouched
    Merge,
}

/// One document write inside an atomic batch
#[derive(Debug, Clone)]
pub struct BatchWrite {
    pub collection: CollectionPath,
    pub id: String,
    pub value: Value,
}

/// Live view of a collection
///
/// The first call to `next` yields the current contents; each later call
/// waits for the next committed change. Intermediate states may be skipped
/// when writes land faster than they are consumed, but every snapshot is
/// complete.
pub struct Subscription {
    rx: watch::Receiver<Arc<Snapshot>>,
    primed: bool,
}

impl Subscription {
    pub fn new(rx: watch::Receiver<Arc<Snapshot>>) -> Self {
        Self { rx, primed: false }
    }

    /// Next snapshot, or `None` once the store has gone away
    pub async fn next(&mut self) -> Option<Arc<Snapshot>> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Contract for the realtime document database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document
    async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<Value>, StoreError>;

    /// Fetch every document in a collection
    async fn get_all(&self, collection: &CollectionPath) -> Result<Snapshot, StoreError>;

    /// Write one document
    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        value: Value,
        mode: WriteMode,
    ) -> Result<(), StoreError>;

    /// Write several documents atomically (all or nothing, replace semantics)
    async fn batch_write(&self, writes: Vec<BatchWrite>) -> Result<(), StoreError>;

    /// Open a live subscription to a collection
    async fn subscribe(&self, collection: &CollectionPath) -> Result<Subscription, StoreError>;
}

/// Check a document id before writing it
pub fn validate_document(id: &str, value: &Value) -> Result<(), StoreError> {
    if id.is_empty() || id.contains('/') {
        return Err(StoreError::InvalidDocumentId(id.to_string()));
    }
    if !value.is_object() {
        return Err(StoreError::NotAnObject(id.to_string()));
    }
    Ok(())
}

/// Recursively merge `patch` into `target`
///
/// Nested objects are merged field by field; any other value in `patch`
/// replaces the stored one.
pub fn merge_json(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_json(existing, value);
                    }
                    _ => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn collection_paths_are_namespaced() {
        assert_eq!(
            CollectionPath::catalog("dsa-tracker-app").as_str(),
            "artifacts/dsa-tracker-app/public/data/dsa_problems"
        );
        assert_eq!(
            CollectionPath::progress("dsa-tracker-app", "u1").to_string(),
            "artifacts/dsa-tracker-app/users/u1/progress"
        );
    }

    #[test]
    fn merge_keeps_absent_fields() {
        let mut stored = json!({"status": "Solved", "updatedAt": "t2", "solvedAt": "t2"});
        merge_json(&mut stored, json!({"status": "To-Do", "updatedAt": "t3"}));
        assert_eq!(stored, json!({"status": "To-Do", "updatedAt": "t3", "solvedAt": "t2"}));
    }

    #[test]
    fn merge_recurses_into_nested_objects() {
        let mut stored = json!({"meta": {"a": 1, "b": 2}, "list": [1, 2]});
        merge_json(&mut stored, json!({"meta": {"b": 3}, "list": [9]}));
        assert_eq!(stored, json!({"meta": {"a": 1, "b": 3}, "list": [9]}));
    }

    #[test]
    fn validate_rejects_bad_documents() {
        assert!(validate_document("ok", &json!({})).is_ok());
        assert!(matches!(
            validate_document("", &json!({})),
            Err(StoreError::InvalidDocumentId(_))
        ));
        assert!(matches!(
            validate_document("a/b", &json!({})),
            Err(StoreError::InvalidDocumentId(_))
        ));
        assert!(matches!(validate_document("ok", &json!(3)), Err(StoreError::NotAnObject(_))));
    }
}
