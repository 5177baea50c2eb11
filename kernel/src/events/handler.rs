//! WebSocket upgrade handler for `GET /ws`.

use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::Response,
};
use tracing::info;

use crate::events::connection::Connection;
use crate::host::MeldState;

/// Upgrades the request and streams events over the socket.
pub async fn handle_ws_upgrade(ws: WebSocketUpgrade, State(state): State<MeldState>) -> Response {
    info!("WebSocket upgrade requested");
    ws.on_upgrade(move |socket| async move {
        let (replay, receiver) = state.subscribe();
        let connection = Connection::new(socket, replay, receiver, state.streams_closed());

        if let Err(e) = connection.run().await {
            tracing::error!(error = %e, "WebSocket connection error");
        }
    })
}
