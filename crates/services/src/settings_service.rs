use std::sync::Arc;

use quiz_core::model::UserSettings;
use storage::SettingsStore;

#[derive(Clone)]
pub struct SettingsService {
    store: Arc<SettingsStore>,
}

impl SettingsService {
    #[must_use]
    pub fn new(store: Arc<SettingsStore>) -> Self {
        Self { store }
    }

    /// Load persisted settings (or defaults if missing or unreadable).
    pub async fn load(&self) -> UserSettings {
        self.store.load().await
    }

    /// Persist new settings and return them.
    pub async fn save(&self, settings: UserSettings) -> UserSettings {
        self.store.save(&settings).await;
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{FontSize, Theme};
    use storage::Storage;

    #[tokio::test]
    async fn saved_settings_load_back() {
        let storage = Storage::in_memory();
        let service = SettingsService::new(Arc::clone(&storage.settings));
        assert_eq!(service.load().await, UserSettings::default());

        let saved = service
            .save(UserSettings::new(Theme::Dark, FontSize::Small))
            .await;
        assert_eq!(service.load().await, saved);
    }
}
