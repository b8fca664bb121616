//! Adapters over an upgraded axum `WebSocket`

use super::{FrameSink, FrameSource};
use crate::error::{SocketError, SocketResult};
use crate::protocol::CloseCode;
use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::borrow::Cow;

/// Read half of an axum websocket
pub struct WsSource {
    stream: SplitStream<WebSocket>,
}

impl WsSource {
    pub fn new(stream: SplitStream<WebSocket>) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl FrameSource for WsSource {
    async fn read_frame(&mut self) -> SocketResult<Vec<u8>> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.into_bytes()),
                Some(Ok(Message::Binary(data))) => return Ok(data),
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                    // Pong replies are handled automatically by axum
                    tracing::trace!("Control frame received");
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(
                        code = frame.as_ref().map(|f| f.code),
                        "Peer sent close frame"
                    );
                    return Err(SocketError::ConnectionClosed);
                }
                Some(Err(e)) => return Err(SocketError::io(e)),
                None => return Err(SocketError::ConnectionClosed),
            }
        }
    }
}

/// Write half of an axum websocket
pub struct WsSink {
    sink: SplitSink<WebSocket, Message>,
}

impl WsSink {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl FrameSink for WsSink {
    async fn write_frame(&mut self, frame: Vec<u8>) -> SocketResult<()> {
        // htmx swaps text frames; anything that is not UTF-8 goes out as binary
        let message = match String::from_utf8(frame) {
            Ok(text) => Message::Text(text),
            Err(e) => Message::Binary(e.into_bytes()),
        };

        self.sink.send(message).await.map_err(SocketError::io)
    }

    async fn close(&mut self, code: CloseCode) -> SocketResult<()> {
        let frame = CloseFrame {
            code: code.as_u16(),
            reason: Cow::Borrowed(code.reason()),
        };

        self.sink
            .send(Message::Close(Some(frame)))
            .await
            .map_err(SocketError::io)
    }
}
