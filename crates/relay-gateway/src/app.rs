use axum::{http::StatusCode, routing::get, Router};
use relay_core::config::RelayConfig;
use relay_hub::{HubHandle, SessionOptions};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: RelayConfig,
    pub hub: HubHandle,
    /// Per-connection settings handed to every new session.
    pub session: SessionOptions,
}

impl AppState {
    pub fn new(config: RelayConfig, hub: HubHandle) -> Self {
        let session = SessionOptions::from(&config.hub);
        Self {
            config,
            hub,
            session,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let handshake_timeout = Duration::from_secs(state.config.server.handshake_timeout_secs);

    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/ws", get(crate::ws::connection::ws_handler))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            handshake_timeout,
        ))
        .layer(TraceLayer::new_for_http())
}
