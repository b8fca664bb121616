//! WebSocket upgrade handler

use super::SocketServer;
use axum::{
    extract::{Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

/// Upgrade the request and hand the socket to the dispatcher
///
/// Requests that are not websocket upgrades are answered with
/// `426 Upgrade Required`.
pub async fn upgrade_handler(
    State(server): State<SocketServer>,
    Query(query): Query<HashMap<String, String>>,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let Some(ws) = ws else {
        tracing::debug!("Rejected request without websocket upgrade");
        return StatusCode::UPGRADE_REQUIRED.into_response();
    };

    let dispatcher = server.dispatcher();
    ws.on_upgrade(move |socket| async move {
        dispatcher.serve_websocket(socket, query).await;
    })
}
