//! Individual WebSocket connection
//!
//! Identity is fixed at upgrade time (upstream auth supplies it), so only
//! the channel subscription set is mutable.

use crate::events::ServerEvent;
use party_core::{ChannelId, Snowflake};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// A single WebSocket connection
pub struct Connection {
    /// Unique connection id (uuid v4)
    connection_id: String,

    /// Authenticated user
    user_id: Snowflake,

    /// Display name supplied at upgrade
    nickname: String,

    /// Channel to send events to the WebSocket
    sender: mpsc::Sender<ServerEvent>,

    /// Channels this connection is subscribed to
    channels: RwLock<HashSet<ChannelId>>,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection
    pub fn new(
        connection_id: String,
        user_id: Snowflake,
        nickname: String,
        sender: mpsc::Sender<ServerEvent>,
    ) -> Arc<Self> {
        Arc::new(Self {
            connection_id,
            user_id,
            nickname,
            sender,
            channels: RwLock::new(HashSet::new()),
            created_at: Instant::now(),
        })
    }

    /// Get the connection id
    pub fn id(&self) -> &str {
        &self.connection_id
    }

    /// Get the user id
    pub fn user_id(&self) -> Snowflake {
        self.user_id
    }

    /// Get the nickname
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Add a channel subscription
    pub fn subscribe(&self, channel: ChannelId) {
        self.channels.write().insert(channel);
    }

    /// Remove a channel subscription
    pub fn unsubscribe(&self, channel: ChannelId) {
        self.channels.write().remove(&channel);
    }

    /// Get all subscribed channels
    pub fn channels(&self) -> Vec<ChannelId> {
        self.channels.read().iter().copied().collect()
    }

    /// Check if subscribed to a channel
    pub fn is_subscribed_to(&self, channel: ChannelId) -> bool {
        self.channels.read().contains(&channel)
    }

    /// Get connection age
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }

    /// Send an event to this connection
    pub async fn send(
        &self,
        event: ServerEvent,
    ) -> Result<(), mpsc::error::SendError<ServerEvent>> {
        self.sender.send(event).await
    }

    /// Check if the sender channel is closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("connection_id", &self.connection_id)
            .field("user_id", &self.user_id)
            .field("nickname", &self.nickname)
            .field("channels", &self.channels.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_connection() -> Arc<Connection> {
        let (tx, _rx) = mpsc::channel(10);
        Connection::new("conn-1".to_string(), Snowflake::new(200), "mina".to_string(), tx)
    }

    #[tokio::test]
    async fn test_connection_identity() {
        let conn = test_connection();
        assert_eq!(conn.id(), "conn-1");
        assert_eq!(conn.user_id(), Snowflake::new(200));
        assert_eq!(conn.nickname(), "mina");
    }

    #[tokio::test]
    async fn test_channel_subscriptions() {
        let conn = test_connection();
        let room = ChannelId::Room(Snowflake::new(42));
        let dm = ChannelId::Conversation(Snowflake::new(7));

        conn.subscribe(room);
        conn.subscribe(dm);
        assert!(conn.is_subscribed_to(room));
        assert_eq!(conn.channels().len(), 2);

        conn.unsubscribe(room);
        assert!(!conn.is_subscribed_to(room));
        assert!(conn.is_subscribed_to(dm));
    }
}
