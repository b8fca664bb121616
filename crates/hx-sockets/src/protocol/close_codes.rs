//! WebSocket close codes
//!
//! The subset of RFC 6455 close codes the dispatcher sends.

use serde::{Deserialize, Serialize};

/// Close codes sent when the server side ends a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Explicit close requested by a handler
    Normal = 1000,
    /// The peer sent a frame that is not a valid envelope
    InvalidPayload = 1007,
    /// A handler panicked while processing a frame
    InternalError = 1011,
}

impl CloseCode {
    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Reason text sent in the close frame
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Normal => "closed",
            Self::InvalidPayload => "malformed envelope",
            Self::InternalError => "internal error",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.as_u16(), self.reason())
    }
}
