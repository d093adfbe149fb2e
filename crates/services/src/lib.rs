#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod sessions;
pub mod settings_service;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use catalog_service::{CatalogService, CategoryStats};
pub use error::{AppServicesError, SessionError};
pub use settings_service::SettingsService;

pub use sessions::{
    AnswerIntake, Navigation, QuestionView, SessionController, SessionLaunch, SessionLauncher,
    SessionPhase, SessionProgress,
};
