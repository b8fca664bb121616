//! Connected client handle
//!
//! Represents one live websocket peer. Handlers receive an `Arc<Client>`
//! and may keep it to push frames later or to reach other clients.

use crate::error::{SocketError, SocketResult};
use crate::protocol::CloseCode;
use crate::transport::FrameSink;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Random bytes behind a client identifier
const CLIENT_ID_BYTES: usize = 12;

/// Opaque client identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Generate a fresh random identifier
    ///
    /// 12 bytes from the thread-local CSPRNG rendered as 16 URL-safe
    /// base64 characters.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; CLIENT_ID_BYTES] = rand::random();
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ClientId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A connected websocket client
pub struct Client {
    /// Unique client ID
    id: ClientId,

    /// Write half of the connection
    sink: Mutex<Box<dyn FrameSink>>,

    /// Set once a close frame was sent or the peer went away
    closed: AtomicBool,

    /// Query parameters of the upgrade request
    query: HashMap<String, String>,

    /// Time of the upgrade
    connected_at: DateTime<Utc>,
}

impl Client {
    /// Create a new client around the write half of a connection
    pub fn new(
        id: ClientId,
        sink: Box<dyn FrameSink>,
        query: HashMap<String, String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            sink: Mutex::new(sink),
            closed: AtomicBool::new(false),
            query,
            connected_at: Utc::now(),
        })
    }

    /// Get the client ID
    pub fn id(&self) -> &ClientId {
        &self.id
    }

    /// Get all query parameters of the upgrade request
    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Get one query parameter of the upgrade request
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Get the time the connection was upgraded
    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Check if the connection has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Send a frame to this client
    ///
    /// UTF-8 payloads are sent as text frames, which is what htmx swaps
    /// into the page. A failed write does not close the connection.
    pub async fn send(&self, frame: impl Into<Vec<u8>>) -> SocketResult<()> {
        let mut sink = self.sink.lock().await;
        if self.is_closed() {
            return Err(SocketError::ConnectionClosed);
        }

        sink.write_frame(frame.into()).await
    }

    /// Close the connection with a normal close frame
    ///
    /// Fails with an `Io` error if the connection was already closed.
    pub async fn close(&self) -> SocketResult<()> {
        self.close_with(CloseCode::Normal).await
    }

    pub(crate) async fn close_with(&self, code: CloseCode) -> SocketResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(SocketError::io("connection already closed"));
        }

        self.sink.lock().await.close(code).await
    }

    /// Record that the peer went away without sending anything back
    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .field("connected_at", &self.connected_at)
            .finish()
    }
}
