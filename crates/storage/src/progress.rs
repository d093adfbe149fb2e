use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use quiz_core::model::{SessionKey, ViewMode};
use tracing::debug;

use crate::document::JsonDocument;
use crate::repository::KeyValueStore;

pub const QUIZ_PROGRESS_KEY: &str = "@quiz:quizProgress";

/// Session key → last visited zero-based index.
///
/// Values are kept signed so a stray negative entry does not make the whole
/// document unreadable; such entries read as `0`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressMap(BTreeMap<String, i64>);

impl ProgressMap {
    #[must_use]
    pub fn get(&self, key: &SessionKey) -> Option<usize> {
        self.0
            .get(key.as_str())
            .map(|raw| usize::try_from(*raw).unwrap_or(0))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn set(&mut self, key: &SessionKey, index: usize) -> bool {
        let value = i64::try_from(index).unwrap_or(i64::MAX);
        self.0.insert(key.as_str().to_owned(), value) != Some(value)
    }
}

/// Persisted last-visited index per session key.
pub struct ProgressStore {
    doc: JsonDocument<ProgressMap>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            doc: JsonDocument::new(QUIZ_PROGRESS_KEY, backend),
        }
    }

    pub async fn get_all(&self) -> ProgressMap {
        self.doc.load().await
    }

    pub async fn get(&self, key: &SessionKey) -> Option<usize> {
        self.doc.load().await.get(key)
    }

    /// Overwrite the stored index.
    pub async fn set(&self, key: &SessionKey, index: usize) {
        let persisted = self.doc.update(|map| map.set(key, index)).await;
        debug!(key = %key, index, persisted, "progress saved");
    }

    /// Raise the stored index to `index` if it is currently lower (missing counts as 0).
    ///
    /// The comparison happens under the document's write gate, so concurrent
    /// advances cannot move the value backwards.
    pub async fn advance(&self, key: &SessionKey, index: usize) {
        let persisted = self
            .doc
            .update(|map| {
                if map.get(key).unwrap_or(0) >= index {
                    return false;
                }
                map.set(key, index)
            })
            .await;
        debug!(key = %key, index, persisted, "progress advanced");
    }

    /// Remove every session entry belonging to a category title, in any mode.
    pub async fn remove_title(&self, title: &str) {
        let keys: Vec<SessionKey> = ViewMode::ALL
            .into_iter()
            .map(|mode| SessionKey::new(mode, title))
            .collect();
        let persisted = self
            .doc
            .update(|map| {
                let before = map.0.len();
                for key in &keys {
                    map.0.remove(key.as_str());
                }
                map.0.len() != before
            })
            .await;
        debug!(title, persisted, "progress entries removed");
    }
}
