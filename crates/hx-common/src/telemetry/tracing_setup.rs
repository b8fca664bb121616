//! Tracing and logging setup
//!
//! One subscriber per process, chosen from the deployment environment.
//! `RUST_LOG` overrides the preset level when set.

use crate::config::Environment;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Output settings for the subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level used when `RUST_LOG` is unset
    pub level: Level,
    /// Emit one JSON object per event instead of human-readable lines
    pub json: bool,
    /// Log span open and close, useful for following one connection
    pub span_events: bool,
    /// Include source file and line
    pub file_line: bool,
}

impl TracingConfig {
    /// Preset for an environment
    ///
    /// Development logs every dispatch at debug level with span events.
    /// Production writes JSON at info level for log shippers.
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: Level::DEBUG,
                json: false,
                span_events: true,
                file_line: true,
            },
            Environment::Staging => Self {
                level: Level::INFO,
                json: false,
                span_events: false,
                file_line: true,
            },
            Environment::Production => Self {
                level: Level::INFO,
                json: true,
                span_events: false,
                file_line: false,
            },
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.to_string()))
    }

    fn fmt_span(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

/// Install the global subscriber
///
/// # Errors
/// Returns `AlreadyInitialized` if a subscriber is already set; the existing
/// one stays in place.
pub fn try_init_tracing(config: &TracingConfig) -> Result<(), TracingError> {
    // Exactly one of the two layers is present
    let json = config.json.then(|| {
        fmt::layer()
            .json()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_span_events(config.fmt_span())
    });
    let text = (!config.json).then(|| {
        fmt::layer()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_span_events(config.fmt_span())
    });

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(json)
        .with(text)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}
