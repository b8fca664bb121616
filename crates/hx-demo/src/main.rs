//! Demo server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p hx-demo
//! ```
//!
//! Configuration is loaded from environment variables.

use hx_common::{try_init_tracing, AppConfig, AppResult, TracingConfig};
use tracing::info;

#[tokio::main]
async fn main() {
    if let Err(e) = start().await {
        // Tracing may not be installed yet, so report on stderr
        eprintln!("[{}] {e}", e.error_code());
        std::process::exit(1);
    }
}

async fn start() -> AppResult<()> {
    // Load configuration before tracing so the environment picks the preset
    let config = AppConfig::from_env()?;
    try_init_tracing(&TracingConfig::for_environment(config.app.env))?;

    info!(
        name = %config.app.name,
        env = ?config.app.env,
        address = %config.server.address(),
        ws_path = %config.server.ws_path,
        "Configuration loaded"
    );

    hx_demo::run(config).await
}
