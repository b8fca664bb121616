//! Trigger handler trait

use crate::connection::Client;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Future returned by a trigger handler
pub type HandlerFuture = BoxFuture<'static, anyhow::Result<()>>;

/// Application logic bound to one trigger name
///
/// Receives the client that sent the message and the raw frame, envelope
/// included. Implemented for any `Fn(Arc<Client>, Vec<u8>) -> impl Future`
/// so async closures can be registered directly. The same handler may run
/// concurrently for different clients.
pub trait TriggerHandler: Send + Sync + 'static {
    fn call(&self, client: Arc<Client>, message: Vec<u8>) -> HandlerFuture;
}

impl<F, Fut> TriggerHandler for F
where
    F: Fn(Arc<Client>, Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn call(&self, client: Arc<Client>, message: Vec<u8>) -> HandlerFuture {
        Box::pin(self(client, message))
    }
}
