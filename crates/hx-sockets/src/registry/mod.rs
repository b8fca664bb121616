//! Trigger and client registry
//!
//! The single piece of state shared between connection tasks.

mod handler;
mod registry;

pub use handler::{HandlerFuture, TriggerHandler};
pub use registry::Registry;
