#![forbid(unsafe_code)]

pub mod answers;
pub mod completed;
mod document;
pub mod progress;
pub mod repository;
pub mod settings;
pub mod sqlite;

pub use answers::AnswerStore;
pub use completed::CompletedSet;
pub use progress::{ProgressMap, ProgressStore};
pub use repository::{InMemoryKeyValueStore, KeyValueStore, Storage, StorageError};
pub use settings::SettingsStore;
