mod app;
mod bridge;
mod config;
mod domain;
mod host;
mod infrastructure;
mod rules;
mod watcher;

use anyhow::Result;
use infrastructure::{directories, logging, shutdown::Shutdown};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let shutdown = Shutdown::new();
    shutdown.install_signal_handlers();

    let app = app::InboxFlowApp::initialize(config, paths, shutdown.clone())?;
    app.run().await
}
