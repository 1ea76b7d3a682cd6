//! deskd - customer service chat router.
//!
//! Matches customers to staff over WebSocket, queues the overflow, and
//! evicts the idle.

use deskd::config::Config;
use deskd::network::{Gateway, SenderTable};
use deskd::state::{spawn_eviction_worker, ChatEngine, Push, TimeoutSupervisor};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        server = %config.server.name,
        address = %config.listen.address,
        idle_timeout_ms = config.chat.idle_timeout_ms,
        "Starting deskd"
    );

    // Outbound delivery table, shared by the engine and every connection.
    let senders = Arc::new(SenderTable::new());

    // Inactivity timers feed an eviction channel drained by a dedicated
    // worker, so expiries run the removal path outside any timer task.
    let (timeouts, evict_rx) = TimeoutSupervisor::new(config.chat.idle_timeout());

    let engine = Arc::new(ChatEngine::new(
        Arc::clone(&timeouts),
        Arc::clone(&senders) as Arc<dyn Push>,
        config.chat.default_staff_name.clone(),
    ));

    spawn_eviction_worker(Arc::clone(&engine), Arc::clone(&timeouts), evict_rx);
    info!("Eviction worker started");

    // Start the Gateway
    let gateway = Gateway::bind(&config, engine, senders).await?;
    gateway.run().await?;

    Ok(())
}
