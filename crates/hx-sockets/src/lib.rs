//! # hx-sockets
//!
//! Websocket dispatch for htmx's `ws` extension.
//!
//! Every inbound frame carries an envelope whose `HEADERS."HX-Trigger"`
//! field names the handler that should process it. The crate owns the
//! per-connection read loop and the registry of live clients and handlers;
//! the embedding application registers handlers and mounts the router.
//!
//! ```no_run
//! use hx_sockets::SocketServer;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let server = SocketServer::new();
//! server.listen("ping", |client: std::sync::Arc<hx_sockets::Client>, _msg: Vec<u8>| async move {
//!     client.send("pong").await?;
//!     anyhow::Ok(())
//! })?;
//!
//! let app = axum::Router::new().merge(server.mount("/ws"));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod transport;

pub use connection::{
    Client, ClientCallback, ClientId, CloseReason, ConnectionState, Dispatcher, LifecycleHooks,
};
pub use error::{SocketError, SocketResult};
pub use protocol::{CloseCode, Envelope, HxHeaders};
pub use registry::{HandlerFuture, Registry, TriggerHandler};
pub use server::SocketServer;
