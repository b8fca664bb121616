//! Connect and disconnect callbacks

use super::Client;
use parking_lot::RwLock;
use std::sync::Arc;

/// Callback invoked with a client when it connects or disconnects
pub type ClientCallback = Arc<dyn Fn(&Arc<Client>) + Send + Sync>;

/// Optional lifecycle callbacks supplied by the embedding application
///
/// Both default to doing nothing. Callbacks run on the connection's own
/// task and are cloned out of the lock before being invoked.
#[derive(Default)]
pub struct LifecycleHooks {
    on_connect: RwLock<Option<ClientCallback>>,
    on_disconnect: RwLock<Option<ClientCallback>>,
}

impl LifecycleHooks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the connect callback
    pub fn set_on_connect<F>(&self, callback: F)
    where
        F: Fn(&Arc<Client>) + Send + Sync + 'static,
    {
        let callback: ClientCallback = Arc::new(callback);
        *self.on_connect.write() = Some(callback);
    }

    /// Replace the disconnect callback
    pub fn set_on_disconnect<F>(&self, callback: F)
    where
        F: Fn(&Arc<Client>) + Send + Sync + 'static,
    {
        let callback: ClientCallback = Arc::new(callback);
        *self.on_disconnect.write() = Some(callback);
    }

    pub(crate) fn connected(&self, client: &Arc<Client>) {
        let callback = self.on_connect.read().clone();
        if let Some(callback) = callback {
            callback(client);
        }
    }

    pub(crate) fn disconnected(&self, client: &Arc<Client>) {
        let callback = self.on_disconnect.read().clone();
        if let Some(callback) = callback {
            callback(client);
        }
    }
}

impl std::fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("on_connect", &self.on_connect.read().is_some())
            .field("on_disconnect", &self.on_disconnect.read().is_some())
            .finish()
    }
}
