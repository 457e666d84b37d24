//! Chat service entry point.
//!
//! Reads `.env`, then the config file named by `REEL_CHAT_CONFIG` (if any),
//! then serves until Ctrl-C.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use server::config::ENV_CONFIG_PATH;
use server::{AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    server::init_tracing(server::DEFAULT_LOG_FILTER);

    info!("Starting reel-chat server");

    let config_path = std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;
    let addr = config.bind_addr()?;

    let state = AppState::from_config(&config)?;
    server::run(state, addr).await
}
