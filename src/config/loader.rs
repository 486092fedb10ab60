use std::env;
use std::path::PathBuf;
use std::time::Duration;

use super::env::{
    AppConfig, ConfigError, DirectoryConfig, LoggingConfig, RulesConfig, SnapshotConfig,
    WatcherConfig,
};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let snapshot_path =
            env::var("SNAPSHOT_PATH").map_err(|_| ConfigError::Missing("SNAPSHOT_PATH"))?;

        let rules = RulesConfig {
            important_senders: env::var("IMPORTANT_SENDERS").ok().map(|v| parse_list(&v)),
            important_keywords: env::var("IMPORTANT_KEYWORDS").ok().map(|v| parse_list(&v)),
        };

        let watcher = WatcherConfig {
            debounce: Duration::from_millis(
                env::var("SCAN_DEBOUNCE_MS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(300),
            ),
            highlight_class: env::var("HIGHLIGHT_CLASS")
                .unwrap_or_else(|_| "inbox-flow-important".to_string()),
        };

        let snapshot = SnapshotConfig {
            path: PathBuf::from(snapshot_path),
            poll_interval: Duration::from_millis(
                env::var("SNAPSHOT_POLL_MS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1_000),
            ),
        };

        let directories = DirectoryConfig {
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        Ok(Self {
            rules,
            watcher,
            snapshot,
            directories,
            logging,
        })
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_parsing_trims_and_drops_empty_entries() {
        assert_eq!(
            parse_list(" github.com, slack.com ,, urgent "),
            vec!["github.com", "slack.com", "urgent"]
        );
        assert!(parse_list("  ,").is_empty());
    }
}
