use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use services::session::DEFAULT_MOCK_SIZE;

pub const CONFIG_FILE: &str = "quiz.toml";

/// Resolved runtime settings for the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_url: String,
    pub mock_size: usize,
    pub mock_seed: Option<u64>,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_url: "sqlite://quiz.sqlite3".into(),
            mock_size: DEFAULT_MOCK_SIZE,
            mock_seed: None,
            log_filter: "info".into(),
        }
    }
}

/// Keys accepted in `quiz.toml`; all optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    db_url: Option<String>,
    mock_size: Option<usize>,
    mock_seed: Option<u64>,
    log_filter: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: String, source: std::io::Error },
    Parse { path: String, source: toml::de::Error },
    InvalidEnv { var: &'static str, raw: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => write!(f, "cannot read {path}: {source}"),
            ConfigError::Parse { path, source } => write!(f, "invalid {path}: {source}"),
            ConfigError::InvalidEnv { var, raw } => write!(f, "invalid {var} value: {raw}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidEnv { .. } => None,
        }
    }
}

impl AppConfig {
    /// Defaults, then `path` if it exists, then `QUIZ_*` environment variables.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if path.exists() {
            let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            config.apply_toml(&raw).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        }
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    fn apply_toml(&mut self, raw: &str) -> Result<(), toml::de::Error> {
        let file: FileConfig = toml::from_str(raw)?;
        if let Some(v) = file.db_url {
            self.db_url = v;
        }
        if let Some(v) = file.mock_size {
            self.mock_size = v;
        }
        if let Some(v) = file.mock_seed {
            self.mock_seed = Some(v);
        }
        if let Some(v) = file.log_filter {
            self.log_filter = v;
        }
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = lookup("QUIZ_DB_URL") {
            self.db_url = v;
        }
        if let Some(v) = lookup("QUIZ_MOCK_SIZE") {
            self.mock_size = v.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "QUIZ_MOCK_SIZE",
                raw: v.clone(),
            })?;
        }
        if let Some(v) = lookup("QUIZ_MOCK_SEED") {
            let seed = v.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "QUIZ_MOCK_SEED",
                raw: v.clone(),
            })?;
            self.mock_seed = Some(seed);
        }
        if let Some(v) = lookup("QUIZ_LOG") {
            self.log_filter = v;
        }
        Ok(())
    }
}
