//! Connection handling
//!
//! Client handles, lifecycle hooks and the per-connection read loop.

mod client;
mod dispatcher;
mod hooks;

pub use client::{Client, ClientId};
pub use dispatcher::{CloseReason, ConnectionState, Dispatcher};
pub use hooks::{ClientCallback, LifecycleHooks};
