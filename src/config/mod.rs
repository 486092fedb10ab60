pub mod env;
mod loader;

pub use env::{AppConfig, DirectoryConfig, RulesConfig, SnapshotConfig, WatcherConfig};
pub use loader::load_config;
