use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vk_photo_bot::bot::{BotContext, Dispatcher};
use vk_photo_bot::config::BotConfig;
use vk_photo_bot::dialogue::InMemStateStore;
use vk_photo_bot::image_pipeline::TransformRegistry;
use vk_photo_bot::localization::init_localization;
use vk_photo_bot::vk::{long_poll, VkClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting VK photo bot");

    init_localization()?;
    let config = BotConfig::from_env()?;

    let client = Arc::new(VkClient::new(&config));
    let ctx = BotContext::new(
        client.clone(),
        Arc::new(InMemStateStore::new()),
        Arc::new(TransformRegistry::with_defaults()),
    );
    let dispatcher = Arc::new(Dispatcher::default());

    info!(api_url = %config.api_url, "Bot initialized, starting long poll");

    tokio::select! {
        result = long_poll::run(client, dispatcher, ctx, config.long_poll_wait_secs) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown requested"),
    }

    Ok(())
}
