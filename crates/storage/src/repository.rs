use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::answers::AnswerStore;
use crate::completed::CompletedSet;
use crate::progress::ProgressStore;
use crate::settings::SettingsStore;

/// Errors surfaced by storage backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// String-keyed persistence contract: one opaque JSON string per key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw value stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Simple in-memory backend for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryKeyValueStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .items
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }
}

/// The four persisted documents behind `Arc`s, sharing one backend.
#[derive(Clone)]
pub struct Storage {
    pub answers: Arc<AnswerStore>,
    pub progress: Arc<ProgressStore>,
    pub completed: Arc<CompletedSet>,
    pub settings: Arc<SettingsStore>,
}

impl Storage {
    #[must_use]
    pub fn from_backend(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            answers: Arc::new(AnswerStore::new(Arc::clone(&backend))),
            progress: Arc::new(ProgressStore::new(Arc::clone(&backend))),
            completed: Arc::new(CompletedSet::new(Arc::clone(&backend))),
            settings: Arc::new(SettingsStore::new(backend)),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(InMemoryKeyValueStore::new()))
    }
}
