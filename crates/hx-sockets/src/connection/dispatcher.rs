//! Connection dispatcher
//!
//! Drives one connection from upgrade to teardown:
//!
//! - `Connecting`: a client is created, registered and announced to the
//!   connect hook.
//! - `Active`: frames are read one at a time and routed by trigger name.
//!   The handler is awaited before the next read, so one client's messages
//!   are processed strictly in arrival order.
//! - `Closed`: the disconnect hook runs, the client leaves the registry and
//!   the stream is released.
//!
//! A handler that returns an error is logged and the loop goes on. A handler
//! that panics is caught and ends the connection, so teardown still runs.

use super::{Client, ClientId, LifecycleHooks};
use crate::error::SocketError;
use crate::protocol::{CloseCode, Envelope};
use crate::registry::Registry;
use crate::transport::{FrameSink, FrameSource, WsSink, WsSource};
use axum::extract::ws::WebSocket;
use futures::FutureExt;
use futures_util::StreamExt;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    /// Upgraded, client not yet registered
    Connecting,
    /// Reading and dispatching frames
    Active,
    /// Torn down, no further reads
    Closed,
}

/// Why a connection's read loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The peer sent a close frame or the stream ended
    PeerClosed,
    /// Reading from the stream failed
    ReadFailed(String),
    /// The peer sent a frame that is not a valid envelope
    MalformedEnvelope(String),
    /// A handler panicked while processing a frame
    HandlerPanicked(String),
}

/// Runs the read loop for each upgraded connection
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    hooks: Arc<LifecycleHooks>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, hooks: Arc<LifecycleHooks>) -> Self {
        Self { registry, hooks }
    }

    /// Serve an upgraded axum websocket until it closes
    pub async fn serve_websocket(
        &self,
        socket: WebSocket,
        query: HashMap<String, String>,
    ) -> CloseReason {
        let (sink, stream) = socket.split();
        self.serve(WsSource::new(stream), WsSink::new(sink), query)
            .await
    }

    /// Serve one connection until it closes
    pub async fn serve<R, W>(
        &self,
        mut source: R,
        sink: W,
        query: HashMap<String, String>,
    ) -> CloseReason
    where
        R: FrameSource,
        W: FrameSink + 'static,
    {
        let mut state = ConnectionState::Connecting;

        let client = Client::new(ClientId::generate(), Box::new(sink), query);
        self.registry.add_client(client.clone());
        self.hooks.connected(&client);

        tracing::info!(client_id = %client.id(), "Client connected");
        transition(&client, &mut state, ConnectionState::Active);

        let reason = loop {
            match source.read_frame().await {
                Ok(frame) => {
                    if let Err(reason) = self.dispatch(&client, frame).await {
                        break reason;
                    }
                }
                Err(SocketError::ConnectionClosed) => break CloseReason::PeerClosed,
                Err(e) => {
                    tracing::warn!(client_id = %client.id(), error = %e, "Read failed");
                    break CloseReason::ReadFailed(e.to_string());
                }
            }
        };

        transition(&client, &mut state, ConnectionState::Closed);
        self.teardown(&client, &reason).await;

        reason
    }

    /// Route one frame to its handler
    ///
    /// Only a malformed envelope or a panicking handler ends the connection.
    async fn dispatch(&self, client: &Arc<Client>, frame: Vec<u8>) -> Result<(), CloseReason> {
        let envelope = match Envelope::parse(&frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(
                    client_id = %client.id(),
                    error = %e,
                    "Failed to parse envelope, closing connection"
                );
                return Err(CloseReason::MalformedEnvelope(e.to_string()));
            }
        };

        let Some(trigger) = envelope.trigger() else {
            tracing::debug!(client_id = %client.id(), "Trigger was blank, message dropped");
            return Ok(());
        };

        let Some(handler) = self.registry.lookup(trigger) else {
            let e = SocketError::UnknownTrigger(trigger.to_string());
            tracing::debug!(client_id = %client.id(), error = %e, "Message dropped");
            return Ok(());
        };

        tracing::trace!(client_id = %client.id(), trigger = %trigger, "Dispatching message");

        match AssertUnwindSafe(handler.call(client.clone(), frame))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                tracing::warn!(
                    client_id = %client.id(),
                    trigger = %trigger,
                    error = %format!("{e:#}"),
                    "Handler failed"
                );
                Ok(())
            }
            Err(panic) => {
                let msg = panic_message(&*panic);
                tracing::error!(
                    client_id = %client.id(),
                    trigger = %trigger,
                    panic = %msg,
                    "Handler panicked, closing connection"
                );
                Err(CloseReason::HandlerPanicked(msg))
            }
        }
    }

    /// Clean up a connection on disconnect
    async fn teardown(&self, client: &Arc<Client>, reason: &CloseReason) {
        self.hooks.disconnected(client);
        self.registry.remove_client(client.id().as_str());

        let code = match reason {
            CloseReason::MalformedEnvelope(_) => Some(CloseCode::InvalidPayload),
            CloseReason::HandlerPanicked(_) => Some(CloseCode::InternalError),
            // The peer is already gone; nothing left to send
            CloseReason::PeerClosed | CloseReason::ReadFailed(_) => None,
        };

        match code {
            Some(code) => {
                // Fails if a handler already closed the client
                if let Err(e) = client.close_with(code).await {
                    tracing::debug!(client_id = %client.id(), error = %e, "Close frame not sent");
                }
            }
            None => client.mark_closed(),
        }

        tracing::info!(client_id = %client.id(), reason = ?reason, "Client disconnected");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic")
        .to_string()
}

fn transition(client: &Client, state: &mut ConnectionState, next: ConnectionState) {
    tracing::trace!(client_id = %client.id(), from = ?state, to = ?next, "State transition");
    *state = next;
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("hooks", &self.hooks)
            .finish()
    }
}
