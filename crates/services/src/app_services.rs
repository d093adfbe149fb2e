use std::sync::Arc;

use storage::Storage;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::sessions::SessionLauncher;
use crate::settings_service::SettingsService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    clock: Clock,
    launcher: Arc<SessionLauncher>,
    catalog: Arc<CatalogService>,
    settings: Arc<SettingsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock) -> Self {
        Self {
            launcher: Arc::new(SessionLauncher::new(storage.clone(), clock)),
            catalog: Arc::new(CatalogService::new(storage.clone())),
            settings: Arc::new(SettingsService::new(Arc::clone(&storage.settings))),
            storage,
            clock,
        }
    }

    /// Configure mock-exam sampling for the session launcher.
    #[must_use]
    pub fn with_mock_sampling(mut self, size: usize, seed: Option<u64>) -> Self {
        self.launcher = Arc::new(
            SessionLauncher::new(self.storage.clone(), self.clock)
                .with_mock_size(size)
                .with_mock_seed(seed),
        );
        self
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn launcher(&self) -> Arc<SessionLauncher> {
        Arc::clone(&self.launcher)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }
}
