use axum::{
    extract::{ws::rejection::WebSocketUpgradeRejection, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use crate::app::AppState;
use crate::ws::socket::WsConnection;

/// Axum handler — upgrades HTTP to WebSocket at GET /ws.
///
/// A request that cannot be upgraded gets a bare 400 and never reaches the hub.
pub async fn ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "websocket upgrade rejected");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    ws.on_upgrade(move |socket| async move {
        if let Err(e) = relay_hub::attach(&state.hub, WsConnection::new(socket), &state.session).await
        {
            warn!(error = %e, "could not admit client");
        }
    })
}
