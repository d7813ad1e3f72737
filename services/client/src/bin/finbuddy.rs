//! services/client/src/bin/finbuddy.rs

use client_lib::{adapters::HttpGateway, config::Config, error::ClientError, terminal};
use finbuddy_core::{ContentGateway, NavAction, Navigator, Notifier};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    // Logs go to stderr so they never interleave with the screen on stdout.
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Using service at {}", config.base_url);

    // --- 2. Initialize the Gateway Adapter ---
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;
    let gateway: Arc<dyn ContentGateway> =
        Arc::new(HttpGateway::new(http, config.base_url.clone()));

    match gateway.ping().await {
        Ok(banner) => info!("Connected: {}", banner),
        Err(e) => warn!("FinBuddy service is not reachable yet: {}", e),
    }

    // --- 3. Build the Navigator ---
    let (notifier, notifications) = Notifier::channel();
    let mut navigator = Navigator::new(gateway, notifier);
    if let Some(stage) = config.initial_stage {
        navigator.dispatch(NavAction::SelectStage(stage)).await;
    }

    // --- 4. Run the Terminal Session ---
    terminal::run(navigator, notifications).await?;
    info!("Goodbye.");
    Ok(())
}
