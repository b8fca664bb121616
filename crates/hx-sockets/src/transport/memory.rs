//! In-memory transport
//!
//! Channel-backed source and sink for driving a dispatcher without a
//! network. The `MemoryPeer` plays the remote browser: it pushes inbound
//! frames and observes everything the server writes back.

use super::{FrameSink, FrameSource};
use crate::error::{SocketError, SocketResult};
use crate::protocol::CloseCode;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// A frame written by the server side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerFrame {
    Data(Vec<u8>),
    Close(CloseCode),
}

impl PeerFrame {
    /// Data frame payload as UTF-8 text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Data(data) => std::str::from_utf8(data).ok(),
            Self::Close(_) => None,
        }
    }
}

/// Create a connected source, sink and peer
pub fn pair() -> (MemorySource, MemorySink, MemoryPeer) {
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    (
        MemorySource { inbound: inbound_rx },
        MemorySink {
            outbound: outbound_tx,
        },
        MemoryPeer {
            inbound: Some(inbound_tx),
            outbound: outbound_rx,
        },
    )
}

/// Server-side read half
pub struct MemorySource {
    inbound: mpsc::UnboundedReceiver<SocketResult<Vec<u8>>>,
}

#[async_trait]
impl FrameSource for MemorySource {
    async fn read_frame(&mut self) -> SocketResult<Vec<u8>> {
        self.inbound
            .recv()
            .await
            .unwrap_or(Err(SocketError::ConnectionClosed))
    }
}

/// Server-side write half
pub struct MemorySink {
    outbound: mpsc::UnboundedSender<PeerFrame>,
}

#[async_trait]
impl FrameSink for MemorySink {
    async fn write_frame(&mut self, frame: Vec<u8>) -> SocketResult<()> {
        self.outbound
            .send(PeerFrame::Data(frame))
            .map_err(|_| SocketError::io("peer dropped"))
    }

    async fn close(&mut self, code: CloseCode) -> SocketResult<()> {
        self.outbound
            .send(PeerFrame::Close(code))
            .map_err(|_| SocketError::io("peer dropped"))
    }
}

/// The remote end of an in-memory connection
pub struct MemoryPeer {
    inbound: Option<mpsc::UnboundedSender<SocketResult<Vec<u8>>>>,
    outbound: mpsc::UnboundedReceiver<PeerFrame>,
}

impl MemoryPeer {
    /// Queue a frame for the server to read
    ///
    /// Returns `false` if the server side is gone or the peer hung up.
    pub fn send(&self, frame: impl Into<Vec<u8>>) -> bool {
        self.inbound
            .as_ref()
            .is_some_and(|tx| tx.send(Ok(frame.into())).is_ok())
    }

    /// Make the server's next read fail with a transport error
    pub fn fail(&self, reason: &str) -> bool {
        self.inbound
            .as_ref()
            .is_some_and(|tx| tx.send(Err(SocketError::io(reason))).is_ok())
    }

    /// Close the inbound direction; queued frames are still delivered
    pub fn hang_up(&mut self) {
        self.inbound = None;
    }

    /// Wait for the next frame written by the server
    pub async fn recv(&mut self) -> Option<PeerFrame> {
        self.outbound.recv().await
    }

    /// Take a frame written by the server if one is ready
    pub fn try_recv(&mut self) -> Option<PeerFrame> {
        self.outbound.try_recv().ok()
    }
}
