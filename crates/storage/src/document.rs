//! Whole-document JSON persistence over a [`KeyValueStore`].
//!
//! Every write is load → mutate → store of the entire document. A per-document
//! write gate is held across that cycle, so two writers in the same process cannot
//! interleave and drop each other's changes.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::repository::{KeyValueStore, StorageError};

pub(crate) struct JsonDocument<T> {
    key: &'static str,
    backend: Arc<dyn KeyValueStore>,
    gate: Mutex<()>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub(crate) fn new(key: &'static str, backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            key,
            backend,
            gate: Mutex::new(()),
            _doc: PhantomData,
        }
    }

    pub(crate) fn key(&self) -> &'static str {
        self.key
    }

    /// Current document; backend failures and malformed JSON degrade to the default.
    pub(crate) async fn load(&self) -> T {
        match self.fetch().await {
            Ok(doc) => doc,
            Err(err) => {
                warn!(key = self.key, error = %err, "document read failed, using default");
                T::default()
            }
        }
    }

    /// Run a read-modify-write cycle under the write gate.
    ///
    /// `mutate` returns whether the document changed; unchanged documents are not
    /// written back. A failed read skips the write so an unreadable document is
    /// never overwritten with a default. Returns whether a write was persisted.
    pub(crate) async fn update<F>(&self, mutate: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        let _guard = self.gate.lock().await;

        let mut doc = match self.fetch().await {
            Ok(doc) => doc,
            Err(err) => {
                warn!(key = self.key, error = %err, "document read failed, dropping write");
                return false;
            }
        };

        if !mutate(&mut doc) {
            return false;
        }

        match self.store(&doc).await {
            Ok(()) => {
                debug!(key = self.key, "document written");
                true
            }
            Err(err) => {
                warn!(key = self.key, error = %err, "document write failed, dropping write");
                false
            }
        }
    }

    async fn fetch(&self) -> Result<T, StorageError> {
        let Some(raw) = self.backend.get_item(self.key).await? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Ok(doc),
            Err(err) => {
                warn!(key = self.key, error = %err, "malformed document treated as absent");
                Ok(T::default())
            }
        }
    }

    async fn store(&self, doc: &T) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(doc).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.backend.set_item(self.key, &raw).await
    }
}

/// Backend whose every call fails, for exercising degraded paths.
#[cfg(test)]
pub(crate) struct BrokenBackend;

#[cfg(test)]
#[async_trait::async_trait]
impl KeyValueStore for BrokenBackend {
    async fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryKeyValueStore;
    use std::collections::BTreeMap;

    type Doc = BTreeMap<String, u32>;

    fn document(backend: Arc<dyn KeyValueStore>) -> JsonDocument<Doc> {
        JsonDocument::new("@test:doc", backend)
    }

    #[tokio::test]
    async fn absent_document_loads_default() {
        let doc = document(Arc::new(InMemoryKeyValueStore::new()));
        assert!(doc.load().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_document_loads_default_and_is_replaced_on_write() {
        let backend = InMemoryKeyValueStore::new();
        backend.set_item("@test:doc", "{not json").await.unwrap();
        let doc = document(Arc::new(backend.clone()));

        assert!(doc.load().await.is_empty());
        assert!(
            doc.update(|map| {
                map.insert("a".into(), 1);
                true
            })
            .await
        );
        assert_eq!(
            backend.get_item("@test:doc").await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
    }

    #[tokio::test]
    async fn unchanged_documents_are_not_written() {
        let backend = InMemoryKeyValueStore::new();
        let doc = document(Arc::new(backend.clone()));
        assert!(!doc.update(|_| false).await);
        assert_eq!(backend.get_item("@test:doc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn broken_backend_degrades_silently() {
        let doc = document(Arc::new(BrokenBackend));
        assert!(doc.load().await.is_empty());
        assert!(
            !doc.update(|map| {
                map.insert("a".into(), 1);
                true
            })
            .await
        );
    }

    #[tokio::test]
    async fn concurrent_updates_to_different_keys_both_survive() {
        let doc = Arc::new(document(Arc::new(InMemoryKeyValueStore::new())));
        let writers = (0..16).map(|i| {
            let doc = Arc::clone(&doc);
            tokio::spawn(async move {
                doc.update(|map| {
                    map.insert(format!("k{i}"), i);
                    true
                })
                .await
            })
        });
        for writer in writers {
            assert!(writer.await.unwrap());
        }
        assert_eq!(doc.load().await.len(), 16);
    }
}
