//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers and talking to them over
//! websockets.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use axum::{routing::get, Router};
use futures_util::{SinkExt, StreamExt};
use hx_sockets::SocketServer;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// How long to wait for a frame before failing a test
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Path the socket is mounted at in test servers
pub const WS_PATH: &str = "/ws";

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub sockets: SocketServer,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server exposing `sockets` at `/ws` and a health route
    pub async fn start(sockets: SocketServer) -> Result<Self> {
        let app = Router::new()
            .route("/health", get(|| async { "OK" }))
            .merge(sockets.mount(WS_PATH));

        Self::start_with_app(sockets, app).await
    }

    /// Start the demo application
    pub async fn start_demo() -> Result<Self> {
        let sockets = hx_demo::create_socket_server()?;
        let app = hx_demo::create_app(&sockets, WS_PATH);

        Self::start_with_app(sockets, app).await
    }

    async fn start_with_app(sockets: SocketServer, app: Router) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        // Spawn server task
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            sockets,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the websocket URL for the server
    pub fn ws_url(&self) -> String {
        format!("ws://{}{}", self.addr, WS_PATH)
    }

    /// Open a websocket connection
    pub async fn connect(&self) -> Result<WsClient> {
        WsClient::connect(&self.ws_url()).await
    }

    /// Open a websocket connection with a query string
    pub async fn connect_with_query(&self, query: &str) -> Result<WsClient> {
        WsClient::connect(&format!("{}?{}", self.ws_url(), query)).await
    }

    /// Wait until exactly `count` clients are registered
    pub async fn wait_for_clients(&self, count: usize) -> Result<()> {
        let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;

        while self.sockets.client_count() != count {
            if tokio::time::Instant::now() > deadline {
                bail!(
                    "expected {count} clients, found {}",
                    self.sockets.client_count()
                );
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Ok(())
    }
}

/// Websocket client speaking to a test server
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Connect to a websocket URL
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) = connect_async(url).await?;
        Ok(Self { stream })
    }

    /// Send a raw text frame
    pub async fn send_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Send an envelope for a trigger with extra payload fields
    pub async fn send_trigger(&mut self, trigger: &str, payload: serde_json::Value) -> Result<()> {
        let mut envelope = serde_json::json!({
            "HEADERS": {
                "HX-Request": "true",
                "HX-Trigger": trigger,
                "HX-Trigger-Name": null,
                "HX-Target": trigger,
                "HX-Current-URL": "http://localhost/"
            }
        });

        if let (Some(envelope), serde_json::Value::Object(fields)) =
            (envelope.as_object_mut(), payload)
        {
            envelope.extend(fields);
        }

        self.send_text(envelope.to_string()).await
    }

    /// Wait for the next data frame and return it as text
    pub async fn recv_text(&mut self) -> Result<String> {
        loop {
            match self.next_message(RECV_TIMEOUT).await? {
                Some(Message::Text(text)) => return Ok(text),
                Some(Message::Binary(data)) => return Ok(String::from_utf8(data)?),
                Some(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Some(Message::Close(frame)) => bail!("connection closed: {frame:?}"),
                None => bail!("stream ended"),
            }
        }
    }

    /// Wait for the server's close frame and return its code
    pub async fn recv_close(&mut self) -> Result<Option<u16>> {
        loop {
            match self.next_message(RECV_TIMEOUT).await? {
                Some(Message::Close(frame)) => return Ok(frame.map(|f| u16::from(f.code))),
                Some(Message::Text(text)) => bail!("expected close, got text {text:?}"),
                Some(_) => {}
                None => return Ok(None),
            }
        }
    }

    /// Assert that no data frame arrives within `window`
    pub async fn expect_silence(&mut self, window: Duration) -> Result<()> {
        match tokio::time::timeout(window, self.stream.next()).await {
            Err(_) => Ok(()),
            Ok(message) => Err(anyhow!("unexpected frame: {message:?}")),
        }
    }

    /// Close the connection from the client side
    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }

    async fn next_message(&mut self, wait: Duration) -> Result<Option<Message>> {
        let message = tokio::time::timeout(wait, self.stream.next())
            .await
            .map_err(|_| anyhow!("timed out waiting for a frame"))?;

        Ok(message.transpose()?)
    }
}
