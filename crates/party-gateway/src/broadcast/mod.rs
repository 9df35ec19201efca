//! Event fan-out
//!
//! The broadcaster accepts events addressed to a channel; the dispatcher
//! replays Redis pub/sub traffic into local connections so fan-out spans
//! every gateway process.

mod broadcaster;
mod dispatcher;

pub use broadcaster::{BroadcastError, Broadcaster};
pub use dispatcher::{EventDispatcher, EventDispatcherConfig};
