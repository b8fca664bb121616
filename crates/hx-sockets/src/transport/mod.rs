//! Frame transport
//!
//! The dispatcher only needs to read whole frames from a peer and write
//! frames back. These traits describe that capability so the read loop is
//! independent of the websocket implementation underneath it.

mod axum_ws;
pub mod memory;

pub use axum_ws::{WsSink, WsSource};

use crate::error::SocketResult;
use crate::protocol::CloseCode;
use async_trait::async_trait;

/// Read half of a connection
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next data frame
    ///
    /// Returns `SocketError::ConnectionClosed` once the peer closes or the
    /// stream ends; any other failure is `SocketError::Io`.
    async fn read_frame(&mut self) -> SocketResult<Vec<u8>>;
}

/// Write half of a connection
#[async_trait]
pub trait FrameSink: Send {
    /// Send one data frame
    async fn write_frame(&mut self, frame: Vec<u8>) -> SocketResult<()>;

    /// Send a close frame with the given code
    async fn close(&mut self, code: CloseCode) -> SocketResult<()>;
}
