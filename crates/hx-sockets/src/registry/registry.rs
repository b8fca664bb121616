//! Registry
//!
//! Tracks live clients and trigger handlers using DashMap for thread-safe access.

use super::TriggerHandler;
use crate::connection::{Client, ClientId};
use crate::error::{SocketError, SocketResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Live clients and trigger handlers shared by every connection task
///
/// Lookups clone the stored `Arc` out of the map so no shard lock is held
/// while a handler or predicate runs.
pub struct Registry {
    /// Handlers by trigger name
    handlers: DashMap<String, Arc<dyn TriggerHandler>>,

    /// Live clients by ID
    clients: DashMap<ClientId, Arc<Client>>,
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
            clients: DashMap::new(),
        }
    }

    /// Create an empty registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Bind a handler to a trigger name
    ///
    /// Fails with `DuplicateTrigger` if the name is taken; the existing
    /// handler stays bound.
    pub fn register(
        &self,
        trigger: impl Into<String>,
        handler: impl TriggerHandler,
    ) -> SocketResult<()> {
        match self.handlers.entry(trigger.into()) {
            Entry::Occupied(entry) => Err(SocketError::DuplicateTrigger(entry.key().clone())),
            Entry::Vacant(entry) => {
                tracing::debug!(trigger = %entry.key(), "Trigger registered");
                entry.insert(Arc::new(handler));
                Ok(())
            }
        }
    }

    /// Find the handler bound to a trigger name
    pub fn lookup(&self, trigger: &str) -> Option<Arc<dyn TriggerHandler>> {
        self.handlers.get(trigger).map(|r| r.value().clone())
    }

    /// Registered trigger names
    pub fn triggers(&self) -> Vec<String> {
        self.handlers.iter().map(|r| r.key().clone()).collect()
    }

    /// Add a live client
    pub fn add_client(&self, client: Arc<Client>) {
        let id = client.id().clone();
        self.clients.insert(id.clone(), client);

        tracing::debug!(client_id = %id, "Client added");
    }

    /// Remove a client, returning it if it was present
    ///
    /// Removing an unknown ID is a no-op.
    pub fn remove_client(&self, id: &str) -> Option<Arc<Client>> {
        let removed = self.clients.remove(id).map(|(_, client)| client);
        if removed.is_some() {
            tracing::debug!(client_id = %id, "Client removed");
        }
        removed
    }

    /// Get a client by ID
    pub fn client_by_id(&self, id: &str) -> Option<Arc<Client>> {
        self.clients.get(id).map(|r| r.value().clone())
    }

    /// Snapshot of all live clients, in no particular order
    pub fn all_clients(&self) -> Vec<Arc<Client>> {
        self.clients.iter().map(|r| r.value().clone()).collect()
    }

    /// Snapshot of the live clients matching a predicate
    ///
    /// The predicate runs on the snapshot, after the map locks are released.
    pub fn clients_matching<F>(&self, predicate: F) -> Vec<Arc<Client>>
    where
        F: Fn(&Client) -> bool,
    {
        self.all_clients()
            .into_iter()
            .filter(|client| predicate(client))
            .collect()
    }

    /// Get the number of live clients
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Get the number of registered triggers
    pub fn trigger_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("clients", &self.clients.len())
            .field("triggers", &self.handlers.len())
            .finish()
    }
}
