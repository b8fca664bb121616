//! WebSocket Integration Tests
//!
//! Every test boots its own server on an ephemeral port; no external
//! services are needed.
//!
//! Run with: cargo test -p integration-tests --test websocket_tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hx_sockets::{Client, SocketServer};
use integration_tests::TestServer;
use reqwest::StatusCode;
use serde_json::json;

fn ping_server() -> SocketServer {
    let sockets = SocketServer::new();
    sockets
        .listen("ping", |client: Arc<Client>, _message: Vec<u8>| async move {
            client.send("pong").await?;
            anyhow::Ok(())
        })
        .unwrap();
    sockets
}

// ============================================================================
// Dispatch Tests
// ============================================================================

#[tokio::test]
async fn test_ping_pong() {
    let server = TestServer::start(ping_server()).await.unwrap();
    let mut ws = server.connect().await.unwrap();

    ws.send_text(r#"{"HEADERS":{"HX-Trigger":"ping"}}"#).await.unwrap();

    assert_eq!(ws.recv_text().await.unwrap(), "pong");
}

#[tokio::test]
async fn test_blank_trigger_keeps_connection_open() {
    let server = TestServer::start(ping_server()).await.unwrap();
    let mut ws = server.connect().await.unwrap();

    ws.send_text(r#"{"HEADERS":{"HX-Trigger":""}}"#).await.unwrap();
    ws.expect_silence(Duration::from_millis(200)).await.unwrap();

    ws.send_trigger("ping", json!({})).await.unwrap();
    assert_eq!(ws.recv_text().await.unwrap(), "pong");
    assert_eq!(server.sockets.client_count(), 1);
}

#[tokio::test]
async fn test_unknown_trigger_keeps_connection_open() {
    let server = TestServer::start(ping_server()).await.unwrap();
    let mut ws = server.connect().await.unwrap();

    ws.send_trigger("nobody-listens", json!({ "value": 1 }))
        .await
        .unwrap();
    ws.expect_silence(Duration::from_millis(200)).await.unwrap();

    ws.send_trigger("ping", json!({})).await.unwrap();
    assert_eq!(ws.recv_text().await.unwrap(), "pong");
}

#[tokio::test]
async fn test_malformed_envelope_closes_connection() {
    let sockets = ping_server();
    let disconnects = Arc::new(AtomicUsize::new(0));
    let counter = disconnects.clone();
    sockets.on_disconnect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let server = TestServer::start(sockets).await.unwrap();
    let mut ws = server.connect().await.unwrap();
    server.wait_for_clients(1).await.unwrap();

    ws.send_text("this is not json").await.unwrap();

    assert_eq!(ws.recv_close().await.unwrap(), Some(1007));
    server.wait_for_clients(0).await.unwrap();
    assert_eq!(disconnects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_panicking_handler_closes_connection() {
    let sockets = ping_server();
    sockets
        .listen("crash", |_client: Arc<Client>, message: Vec<u8>| async move {
            assert!(message.is_empty(), "crash requested");
            anyhow::Ok(())
        })
        .unwrap();

    let server = TestServer::start(sockets).await.unwrap();
    let mut ws = server.connect().await.unwrap();
    server.wait_for_clients(1).await.unwrap();

    ws.send_trigger("crash", json!({})).await.unwrap();

    assert_eq!(ws.recv_close().await.unwrap(), Some(1011));
    server.wait_for_clients(0).await.unwrap();
    assert!(server.sockets.list_clients().is_empty());
}

#[tokio::test]
async fn test_frames_dispatched_in_order() {
    let sockets = SocketServer::new();
    sockets
        .listen("step", |client: Arc<Client>, message: Vec<u8>| async move {
            let value: serde_json::Value = serde_json::from_slice(&message)?;
            client.send(value["n"].to_string()).await?;
            anyhow::Ok(())
        })
        .unwrap();

    let server = TestServer::start(sockets).await.unwrap();
    let mut ws = server.connect().await.unwrap();

    for n in 0..20 {
        ws.send_trigger("step", json!({ "n": n })).await.unwrap();
    }

    for n in 0..20 {
        assert_eq!(ws.recv_text().await.unwrap(), n.to_string());
    }
}

#[tokio::test]
async fn test_concurrent_clients_share_a_trigger() {
    let server = TestServer::start(ping_server()).await.unwrap();
    let mut first = server.connect().await.unwrap();
    let mut second = server.connect().await.unwrap();

    first.send_trigger("ping", json!({})).await.unwrap();
    second.send_trigger("ping", json!({})).await.unwrap();

    assert_eq!(first.recv_text().await.unwrap(), "pong");
    assert_eq!(second.recv_text().await.unwrap(), "pong");
}

// ============================================================================
// Client Registry Tests
// ============================================================================

#[tokio::test]
async fn test_client_close_removes_client() {
    let connects = Arc::new(AtomicUsize::new(0));
    let sockets = ping_server();
    let counter = connects.clone();
    sockets.on_connect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let server = TestServer::start(sockets).await.unwrap();
    let first = server.connect().await.unwrap();
    let second = server.connect().await.unwrap();
    server.wait_for_clients(2).await.unwrap();
    assert_eq!(connects.load(Ordering::SeqCst), 2);

    first.close().await.unwrap();
    server.wait_for_clients(1).await.unwrap();

    second.close().await.unwrap();
    server.wait_for_clients(0).await.unwrap();
}

#[tokio::test]
async fn test_filter_clients_by_query() {
    let server = TestServer::start(ping_server()).await.unwrap();
    let _lobby = server.connect_with_query("room=lobby").await.unwrap();
    let _kitchen = server.connect_with_query("room=kitchen").await.unwrap();
    server.wait_for_clients(2).await.unwrap();

    let lobby = server
        .sockets
        .filter_clients(|c| c.query_param("room") == Some("lobby"));
    assert_eq!(lobby.len(), 1);

    let id = lobby[0].id().clone();
    assert!(server.sockets.find_client(id.as_str()).is_some());
    assert_eq!(server.sockets.list_clients().len(), 2);
}

#[tokio::test]
async fn test_handler_broadcasts_to_every_client() {
    let sockets = SocketServer::new();
    let everyone = sockets.clone();
    sockets
        .listen("shout", move |_client: Arc<Client>, _message: Vec<u8>| {
            let everyone = everyone.clone();
            async move {
                everyone.broadcast("<div id=\"news\">hello all</div>").await;
                anyhow::Ok(())
            }
        })
        .unwrap();

    let server = TestServer::start(sockets).await.unwrap();
    let mut first = server.connect().await.unwrap();
    let mut second = server.connect().await.unwrap();
    server.wait_for_clients(2).await.unwrap();

    first.send_trigger("shout", json!({})).await.unwrap();

    assert_eq!(first.recv_text().await.unwrap(), "<div id=\"news\">hello all</div>");
    assert_eq!(second.recv_text().await.unwrap(), "<div id=\"news\">hello all</div>");
}

#[tokio::test]
async fn test_handler_sends_to_another_client() {
    let sockets = SocketServer::new();
    let directory = sockets.clone();
    sockets
        .listen("tell", move |_client: Arc<Client>, message: Vec<u8>| {
            let directory = directory.clone();
            async move {
                let value: serde_json::Value = serde_json::from_slice(&message)?;
                let to = value["to"].as_str().unwrap_or_default();
                if let Some(target) = directory.find_client(to) {
                    target.send(value["text"].as_str().unwrap_or_default()).await?;
                }
                anyhow::Ok(())
            }
        })
        .unwrap();

    let server = TestServer::start(sockets).await.unwrap();
    let mut sender = server.connect().await.unwrap();
    server.wait_for_clients(1).await.unwrap();
    let sender_id = server.sockets.list_clients()[0].id().clone();

    let mut receiver = server.connect().await.unwrap();
    server.wait_for_clients(2).await.unwrap();
    let receiver_id = server
        .sockets
        .filter_clients(|c| c.id() != &sender_id)
        .pop()
        .unwrap()
        .id()
        .clone();

    sender
        .send_trigger("tell", json!({ "to": receiver_id.as_str(), "text": "psst" }))
        .await
        .unwrap();

    assert_eq!(receiver.recv_text().await.unwrap(), "psst");
    sender.expect_silence(Duration::from_millis(200)).await.unwrap();
}

// ============================================================================
// HTTP Tests
// ============================================================================

#[tokio::test]
async fn test_plain_get_requires_upgrade() {
    let server = TestServer::start(ping_server()).await.unwrap();

    let response = reqwest::get(format!("{}/ws", server.base_url()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UPGRADE_REQUIRED);
    assert_eq!(server.sockets.client_count(), 0);
}

// ============================================================================
// Demo Application Tests
// ============================================================================

#[tokio::test]
async fn test_demo_health_check() {
    let server = TestServer::start_demo().await.unwrap();

    let response = reqwest::get(format!("{}/health", server.base_url()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_demo_toggle_round_trip() {
    let server = TestServer::start_demo().await.unwrap();
    let mut ws = server.connect().await.unwrap();

    ws.send_trigger(hx_demo::toggle::TRIGGER, json!({ "state": false }))
        .await
        .unwrap();
    assert_eq!(ws.recv_text().await.unwrap(), hx_demo::toggle::render_button(true));

    ws.send_trigger(hx_demo::toggle::TRIGGER, json!({ "state": true }))
        .await
        .unwrap();
    assert_eq!(ws.recv_text().await.unwrap(), hx_demo::toggle::render_button(false));
}
