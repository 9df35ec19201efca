//! Room session protocol
//!
//! Drives the per-connection room lifecycle: joins, messages, leaves, and
//! disconnect cleanup. All client events land here through one exhaustive
//! match.

mod handler;
mod messages;

pub use handler::SessionHandler;
pub use messages::{MessageService, MAX_CONTENT_LEN};
