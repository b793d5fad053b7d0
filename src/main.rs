//! PayLink daemon
//!
//! Opens the local store, connects to the configured Shardeum RPC endpoint
//! and keeps stored pending transactions and wallet state up to date until
//! interrupted.
use anyhow::Context;
use dotenv::dotenv;
use log::{error, info, warn};
use paylink::{create_http_provider, AppConfig, ServiceContainer, SqliteStore, WalletEvent};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// Application entry point
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging with default level of "info"
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    info!("Starting PayLink v{}", paylink::VERSION);

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // Setup the local store
    info!("Opening database {}...", config.database_url);
    let store = SqliteStore::connect(&config.database_url)
        .await
        .context("Failed to open database")?;
    if let Err(e) = store.migrate().await {
        error!("Failed to run migrations: {}", e);
        return Err(e);
    }
    info!("Migrations completed successfully");

    info!(
        "Connecting to {} at {}...",
        config.network.chain_name, config.network.rpc_url
    );
    let provider = create_http_provider(&config.network.rpc_url);
    let store = Arc::new(store);
    let services = ServiceContainer::new(config, store.clone(), provider);

    // Start background services
    let mut status_service = services.transaction_status_service();
    if let Err(e) = status_service.start().await {
        error!("Failed to start transaction status service: {}", e);
    }

    let mut watcher = services.wallet_watcher();
    let mut events = watcher.subscribe();
    watcher.start().await;

    info!("PayLink is running! Press Ctrl+C to stop.");
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(WalletEvent::AccountsChanged(accounts)) => match accounts.first() {
                    Some(account) => info!("Active account changed to {}", account),
                    None => info!("Wallet disconnected"),
                },
                Ok(WalletEvent::ChainChanged(chain_id)) => {
                    if services.client().network().matches_chain(&chain_id) {
                        info!("Wallet switched to {}", services.config().network.chain_name);
                    } else {
                        warn!("Wallet switched to unsupported chain {}", chain_id);
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {} wallet events", skipped),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    // Stop background services
    info!("Stopping background services...");
    watcher.stop().await;
    status_service.stop().await;
    store.close().await;

    Ok(())
}
