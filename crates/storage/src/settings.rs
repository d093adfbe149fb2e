use std::sync::Arc;

use quiz_core::model::UserSettings;
use tracing::debug;

use crate::document::JsonDocument;
use crate::repository::KeyValueStore;

pub const USER_SETTINGS_KEY: &str = "@quiz:userSettings";

/// Persisted display preferences.
pub struct SettingsStore {
    doc: JsonDocument<UserSettings>,
}

impl SettingsStore {
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            doc: JsonDocument::new(USER_SETTINGS_KEY, backend),
        }
    }

    /// Stored settings, or defaults when none are stored.
    pub async fn load(&self) -> UserSettings {
        self.doc.load().await
    }

    pub async fn save(&self, settings: &UserSettings) {
        let persisted = self
            .doc
            .update(|current| {
                let changed = *current != *settings;
                *current = *settings;
                changed
            })
            .await;
        debug!(persisted, "settings saved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryKeyValueStore;
    use quiz_core::model::{FontSize, Theme};

    #[tokio::test]
    async fn defaults_until_saved() {
        let store = SettingsStore::new(Arc::new(InMemoryKeyValueStore::new()));
        assert_eq!(store.load().await, UserSettings::default());

        let dark = UserSettings::new(Theme::Dark, FontSize::Small);
        store.save(&dark).await;
        assert_eq!(store.load().await, dark);
    }
}
