//! In-process document store with live subscriptions

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use super::{
    BatchWrite, CollectionPath, DocumentStore, Snapshot, StoreError, Subscription, WriteMode,
    merge_json, validate_document,
};

/// One collection and the channel its subscribers listen on
struct Collection {
    documents: Snapshot,
    tx: watch::Sender<Arc<Snapshot>>,
}

impl Collection {
    fn new(documents: Snapshot) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(documents.clone()));
        Self { documents, tx }
    }

    /// Publish the current contents to subscribers
    fn publish(&self) {
        self.tx.send_replace(Arc::new(self.documents.clone()));
    }
}

/// Document store held entirely in memory
///
/// Clones share the same underlying collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<HashMap<CollectionPath, Collection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with collections
    pub fn with_collections(collections: BTreeMap<CollectionPath, Snapshot>) -> Self {
        let collections = collections
            .into_iter()
            .map(|(path, documents)| (path, Collection::new(documents)))
            .collect();
        Self { collections: Arc::new(Mutex::new(collections)) }
    }

    /// Apply `changes` atomically
    ///
    /// Every change is validated and staged first. `durable` sees the staged
    /// state and may refuse it; only after it succeeds are the changes
    /// committed and published. On any error the store is left untouched.
    pub(crate) fn commit(
        &self,
        changes: Vec<Change>,
        durable: impl FnOnce(&Staged<'_>) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        for change in &changes {
            validate_document(&change.id, &change.value)?;
        }

        let mut guard = self.collections.lock().map_err(|_| StoreError::Poisoned)?;

        let mut changed: BTreeMap<CollectionPath, Snapshot> = BTreeMap::new();
        for Change { collection, id, value, mode } in changes {
            let documents = changed.entry(collection).or_insert_with_key(|path| {
                guard.get(path).map(|c| c.documents.clone()).unwrap_or_default()
            });
            match documents.get_mut(&id) {
                Some(existing) if mode == WriteMode::Merge => merge_json(existing, value),
                _ => {
                    documents.insert(id, value);
                }
            }
        }

        durable(&Staged { current: &guard, changed: &changed })?;

        for (path, documents) in changed {
            tracing::debug!("Committed {} ({} documents)", path, documents.len());
            let entry = guard.entry(path).or_insert_with(|| Collection::new(Snapshot::new()));
            entry.documents = documents;
            entry.publish();
        }
        Ok(())
    }
}

/// One document write waiting to be committed
#[derive(Debug, Clone)]
pub(crate) struct Change {
    pub collection: CollectionPath,
    pub id: String,
    pub value: Value,
    pub mode: WriteMode,
}

/// The store as it would look once a commit lands
pub(crate) struct Staged<'a> {
    current: &'a HashMap<CollectionPath, Collection>,
    changed: &'a BTreeMap<CollectionPath, Snapshot>,
}

impl Staged<'_> {
    /// Every non-empty collection, with the staged changes applied
    pub fn collections(&self) -> BTreeMap<CollectionPath, Snapshot> {
        let untouched = self
            .current
            .iter()
            .filter(|(path, _)| !self.changed.contains_key(*path))
            .map(|(path, c)| (path.clone(), c.documents.clone()));
        let changed = self.changed.iter().map(|(path, docs)| (path.clone(), docs.clone()));

        untouched.chain(changed).filter(|(_, docs)| !docs.is_empty()).collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<Value>, StoreError> {
        let guard = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.get(collection).and_then(|c| c.documents.get(id).cloned()))
    }

    async fn get_all(&self, collection: &CollectionPath) -> Result<Snapshot, StoreError> {
        let guard = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.get(collection).map(|c| c.documents.clone()).unwrap_or_default())
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        value: Value,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let change = Change { collection: collection.clone(), id: id.to_string(), value, mode };
        self.commit(vec![change], |_| Ok(()))
    }

    async fn batch_write(&self, writes: Vec<BatchWrite>) -> Result<(), StoreError> {
        self.commit(writes.into_iter().map(Change::from).collect(), |_| Ok(()))
    }

    async fn subscribe(&self, collection: &CollectionPath) -> Result<Subscription, StoreError> {
        let mut guard = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
        let entry =
            guard.entry(collection.clone()).or_insert_with(|| Collection::new(Snapshot::new()));
        Ok(Subscription::new(entry.tx.subscribe()))
    }
}

impl From<BatchWrite> for Change {
    fn from(write: BatchWrite) -> Self {
        let BatchWrite { collection, id, value } = write;
        Self { collection, id, value, mode: WriteMode::Replace }
    }
}
