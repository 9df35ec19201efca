//! Connection management
//!
//! Tracks live WebSocket connections and their channel subscriptions.

mod connection;
mod manager;

pub use connection::Connection;
pub use manager::ConnectionManager;
