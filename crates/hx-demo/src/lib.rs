//! # hx-demo
//!
//! A single toggle button whose state lives on the server. Clicking it
//! sends the `some_message` trigger over the websocket and the handler
//! answers with the re-rendered button.

pub mod toggle;

use axum::{response::Html, routing::get, Router};
use hx_common::{AppConfig, AppError, AppResult};
use hx_sockets::{SocketResult, SocketServer};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the socket server with every demo trigger registered
pub fn create_socket_server() -> SocketResult<SocketServer> {
    let server = SocketServer::new();
    toggle::register(&server)?;

    server.on_connect(|client| {
        tracing::info!(client_id = %client.id(), "Browser connected");
    });
    server.on_disconnect(|client| {
        tracing::info!(client_id = %client.id(), "Browser disconnected");
    });

    Ok(server)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(server: &SocketServer, ws_path: &str) -> Router {
    let index = Html(toggle::index_page(ws_path));

    Router::new()
        .route("/", get(move || async move { index }))
        .route("/health", get(health_check))
        .merge(server.mount(ws_path))
        .layer(TraceLayer::new_for_http())
}

/// Run the server until it fails
pub async fn run_server(app: Router, addr: &str) -> AppResult<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::bind(addr, e))?;

    let local: SocketAddr = listener.local_addr().map_err(AppError::internal)?;
    tracing::info!("Listening on http://{}", local);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}

/// Run the demo with configuration
pub async fn run(config: AppConfig) -> AppResult<()> {
    let server = create_socket_server().map_err(AppError::internal)?;
    let app = create_app(&server, &config.server.ws_path);

    run_server(app, &config.server.address()).await
}
