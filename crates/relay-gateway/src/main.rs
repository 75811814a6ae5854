use clap::Parser;
use relay_core::config::RelayConfig;
use relay_gateway::app;
use relay_hub::Hub;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Real-time broadcast hub over WebSocket.
#[derive(Debug, Parser)]
#[command(name = "relay-gateway", version, about)]
struct Cli {
    /// Path to relay.toml (falls back to RELAY_CONFIG, then ./relay.toml).
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay_gateway=info,relay_hub=info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    // load config: --config > RELAY_CONFIG env > ./relay.toml
    let config_path = cli.config.or_else(|| std::env::var("RELAY_CONFIG").ok());
    let config = RelayConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        RelayConfig::default()
    });

    let addr: SocketAddr = config.listen_addr().parse()?;

    // hub loop owns membership; everything else talks to it via the handle
    let (hub, handle) = Hub::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let hub_task = tokio::spawn(hub.run(shutdown_rx));

    let state = Arc::new(app::AppState::new(config, handle));
    let router = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Relay gateway listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            wait_for_ctrl_c().await;
            info!("shutdown requested, closing client queues");
            // signal hub to stop; writers send close frames as their queues close
            let _ = shutdown_tx.send(true);
        })
        .await?;

    let _ = hub_task.await;
    Ok(())
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
