use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rules: RulesConfig,
    pub watcher: WatcherConfig,
    pub snapshot: SnapshotConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
}

/// Optional overrides for the built-in importance rule set.
#[derive(Debug, Clone, Default)]
pub struct RulesConfig {
    pub important_senders: Option<Vec<String>>,
    pub important_keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub debounce: Duration,
    pub highlight_class: String,
}

#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub path: PathBuf,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
}
