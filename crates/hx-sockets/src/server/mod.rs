//! Socket server
//!
//! The handle the embedding application keeps: handler registration,
//! lifecycle hooks, client lookup, and the axum router for the endpoint.

mod handler;

pub use handler::upgrade_handler;

use crate::connection::{Client, Dispatcher, LifecycleHooks};
use crate::error::SocketResult;
use crate::registry::Registry;
use axum::{routing::get, Router};
use std::future::Future;
use std::sync::Arc;

/// Websocket endpoint with trigger-keyed handlers
///
/// Cheap to clone; every clone shares the same registry and hooks.
#[derive(Clone, Default)]
pub struct SocketServer {
    registry: Arc<Registry>,
    hooks: Arc<LifecycleHooks>,
}

impl SocketServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler to a trigger name
    ///
    /// The trigger is the `id` of the htmx element that sends the message.
    /// Fails with `DuplicateTrigger` if another handler already owns it.
    ///
    /// ```
    /// # use hx_sockets::{Client, SocketServer};
    /// # use std::sync::Arc;
    /// let server = SocketServer::new();
    /// server
    ///     .listen("some-event", |_client: Arc<Client>, message: Vec<u8>| async move {
    ///         tracing::info!(len = message.len(), "received");
    ///         anyhow::Ok(())
    ///     })
    ///     .unwrap();
    /// assert!(server.listen("some-event", |_c: Arc<Client>, _m: Vec<u8>| async { anyhow::Ok(()) }).is_err());
    /// ```
    pub fn listen<F, Fut>(&self, trigger: impl Into<String>, handler: F) -> SocketResult<()>
    where
        F: Fn(Arc<Client>, Vec<u8>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.registry.register(trigger, handler)
    }

    /// Run a callback whenever a client connects
    pub fn on_connect<F>(&self, callback: F)
    where
        F: Fn(&Arc<Client>) + Send + Sync + 'static,
    {
        self.hooks.set_on_connect(callback);
    }

    /// Run a callback whenever a client disconnects
    ///
    /// The client is still listed while the callback runs; closing the
    /// stream and removing the client happen afterwards.
    pub fn on_disconnect<F>(&self, callback: F)
    where
        F: Fn(&Arc<Client>) + Send + Sync + 'static,
    {
        self.hooks.set_on_disconnect(callback);
    }

    /// All connected clients
    pub fn list_clients(&self) -> Vec<Arc<Client>> {
        self.registry.all_clients()
    }

    /// Find a connected client by ID
    pub fn find_client(&self, id: &str) -> Option<Arc<Client>> {
        self.registry.client_by_id(id)
    }

    /// Connected clients the predicate accepts
    pub fn filter_clients<F>(&self, predicate: F) -> Vec<Arc<Client>>
    where
        F: Fn(&Client) -> bool,
    {
        self.registry.clients_matching(predicate)
    }

    /// Get the number of connected clients
    pub fn client_count(&self) -> usize {
        self.registry.client_count()
    }

    /// Send a frame to every connected client
    ///
    /// Returns the number of clients the frame was written to.
    pub async fn broadcast(&self, frame: impl Into<Vec<u8>>) -> usize {
        let frame = frame.into();
        let mut sent = 0;

        for client in self.list_clients() {
            match client.send(frame.clone()).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    tracing::debug!(client_id = %client.id(), error = %e, "Broadcast write failed");
                }
            }
        }

        tracing::trace!(sent = sent, "Frame broadcast to all clients");

        sent
    }

    /// Get the shared registry
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Create a dispatcher sharing this server's registry and hooks
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(self.registry.clone(), self.hooks.clone())
    }

    /// Router that serves the websocket endpoint at `path`
    ///
    /// Merge it into the application's router:
    /// `Router::new().route("/", get(index)).merge(server.mount("/ws"))`.
    pub fn mount(&self, path: &str) -> Router {
        tracing::debug!(path = %path, "Mounting websocket endpoint");

        Router::new()
            .route(path, get(upgrade_handler))
            .with_state(self.clone())
    }
}

impl std::fmt::Debug for SocketServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketServer")
            .field("registry", &self.registry)
            .field("hooks", &self.hooks)
            .finish()
    }
}
