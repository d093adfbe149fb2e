use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::document::JsonDocument;
use crate::repository::KeyValueStore;

pub const COMPLETED_CATEGORIES_KEY: &str = "@quiz:completedCategories";

/// Persisted category title → completed flag.
pub struct CompletedSet {
    doc: JsonDocument<BTreeMap<String, bool>>,
}

impl CompletedSet {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            doc: JsonDocument::new(COMPLETED_CATEGORIES_KEY, backend),
        }
    }

    pub async fn get_all(&self) -> BTreeMap<String, bool> {
        self.doc.load().await
    }

    pub async fn is_completed(&self, title: &str) -> bool {
        self.doc.load().await.get(title).copied().unwrap_or(false)
    }

    /// Mark a category completed. Marking twice leaves a single `true` entry.
    pub async fn mark_completed(&self, title: &str) {
        let persisted = self
            .doc
            .update(|map| map.insert(title.to_owned(), true) != Some(true))
            .await;
        debug!(title, persisted, "category marked completed");
    }

    /// Drop the completed flag for a category.
    pub async fn clear(&self, title: &str) {
        let persisted = self
            .doc
            .update(|map| map.remove(title).is_some())
            .await;
        debug!(title, persisted, "category completion cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryKeyValueStore;

    #[tokio::test]
    async fn mark_is_idempotent() {
        let backend = InMemoryKeyValueStore::new();
        let completed = CompletedSet::new(Arc::new(backend.clone()));

        completed.mark_completed("Law").await;
        completed.mark_completed("Law").await;

        let all = completed.get_all().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all.get("Law"), Some(&true));
        assert_eq!(
            backend
                .get_item(COMPLETED_CATEGORIES_KEY)
                .await
                .unwrap()
                .as_deref(),
            Some(r#"{"Law":true}"#)
        );
    }

    #[tokio::test]
    async fn clear_removes_flag() {
        let completed = CompletedSet::new(Arc::new(InMemoryKeyValueStore::new()));
        completed.mark_completed("Law").await;
        assert!(completed.is_completed("Law").await);

        completed.clear("Law").await;
        completed.clear("Law").await;
        assert!(!completed.is_completed("Law").await);
        assert!(completed.get_all().await.is_empty());
    }
}
