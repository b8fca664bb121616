//! Wire protocol definitions
//!
//! The inbound envelope format and the close codes the dispatcher sends.

mod close_codes;
mod envelope;

pub use close_codes::CloseCode;
pub use envelope::{Envelope, HxHeaders};
