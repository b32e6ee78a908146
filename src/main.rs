mod config;
mod menu;
mod platform;
mod router;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::router::Router;

#[tokio::main]
async fn main() -> Result<()> {
    // .env may carry BOT_TOKEN and RUST_LOG, so load it before logging
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,talkingfine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let explicit_path = std::env::args().nth(1).map(PathBuf::from);
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path, explicit_path.is_some())
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Skip pending updates: {}", config.telegram.skip_pending);
    info!(
        "  Menu: {}",
        config
            .content
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string())
    );

    let menu = menu::loader::load_menu(config.content.path.as_deref()).await?;
    let router = Arc::new(Router::new(menu));

    info!("TalkingFine bot started");
    platform::telegram::run(
        router,
        &config.telegram.bot_token,
        config.telegram.skip_pending,
    )
    .await?;

    Ok(())
}
