//! Document store persisted to a JSON file
//!
//! Reads go to the in-memory copy. A write is committed to memory and
//! published only after the file holding its result has been written (to a
//! temporary sibling first, then renamed into place).

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::memory::{Change, Staged};
use super::{
    BatchWrite, CollectionPath, DocumentStore, MemoryStore, Snapshot, StoreError, Subscription,
    WriteMode,
};

/// On-disk layout of the store file
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    /// Collection path -> document id -> document
    collections: BTreeMap<String, Snapshot>,
}

/// `MemoryStore` backed by a JSON file
pub struct FileStore {
    inner: MemoryStore,
    path: PathBuf,
}

impl FileStore {
    /// Open the store at `path`, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let inner = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let file: StoreFile = serde_json::from_str(&contents)?;
            let collections = file
                .collections
                .into_iter()
                .map(|(path, documents)| (CollectionPath::new(path), documents))
                .collect();
            MemoryStore::with_collections(collections)
        } else {
            MemoryStore::new()
        };

        tracing::debug!("Opened document store at {}", path.display());
        Ok(Self { inner, path })
    }

    /// Write the staged state to the backing file
    ///
    /// Runs under the store lock, so rewrites never interleave.
    fn persist(&self, staged: &Staged<'_>) -> Result<(), StoreError> {
        let file = StoreFile {
            collections: staged
                .collections()
                .into_iter()
                .map(|(path, documents)| (path.as_str().to_string(), documents))
                .collect(),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&file)?)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn get_all(&self, collection: &CollectionPath) -> Result<Snapshot, StoreError> {
        self.inner.get_all(collection).await
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        value: Value,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let change = Change { collection: collection.clone(), id: id.to_string(), value, mode };
        self.inner.commit(vec![change], |staged| self.persist(staged))
    }

    async fn batch_write(&self, writes: Vec<BatchWrite>) -> Result<(), StoreError> {
        let changes = writes.into_iter().map(Change::from).collect();
        self.inner.commit(changes, |staged| self.persist(staged))
    }

    async fn subscribe(&self, collection: &CollectionPath) -> Result<Subscription, StoreError> {
        self.inner.subscribe(collection).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let progress = CollectionPath::progress("app", "u1");

        {
            let store = FileStore::open(&path).unwrap();
            store
                .set(&progress, "cses_1068", json!({"status": "Solved"}), WriteMode::Merge)
                .await
                .unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(&progress, "cses_1068").await.unwrap(),
            Some(json!({"status": "Solved"}))
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).unwrap();
        assert!(store.get_all(&CollectionPath::catalog("app")).await.unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn failed_batch_does_not_touch_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();

        let writes = vec![BatchWrite {
            collection: CollectionPath::catalog("app"),
            id: String::new(),
            value: json!({}),
        }];
        assert!(store.batch_write(writes).await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn unwritable_file_leaves_store_untouched() {
        let dir = tempdir().unwrap();
        // The store file's parent is a regular file, so every save fails
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let store = FileStore::open(blocker.join("store.json")).unwrap();
        let catalog = CollectionPath::catalog("app");

        let mut sub = store.subscribe(&catalog).await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());

        let writes = vec![BatchWrite {
            collection: catalog.clone(),
            id: "T".to_string(),
            value: json!({"topic": "T"}),
        }];
        assert!(matches!(store.batch_write(writes).await, Err(StoreError::Io(_))));
        assert!(
            store
                .set(&catalog, "U", json!({"topic": "U"}), WriteMode::Merge)
                .await
                .is_err()
        );

        assert!(store.get_all(&catalog).await.unwrap().is_empty());
        let published =
            tokio::time::timeout(std::time::Duration::from_millis(50), sub.next()).await;
        assert!(published.is_err(), "nothing is published for a failed save");
    }
}
