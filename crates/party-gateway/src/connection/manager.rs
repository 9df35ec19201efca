//! Connection manager
//!
//! Manages all active WebSocket connections using DashMap for thread-safe
//! access. Fan-out to a channel walks the channel's connection set and
//! pushes onto each connection's mpsc sender.

use super::Connection;
use crate::events::ServerEvent;
use dashmap::DashMap;
use party_core::{ChannelId, Snowflake};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Manages all active WebSocket connections
pub struct ConnectionManager {
    /// Active connections by connection id
    connections: DashMap<String, Arc<Connection>>,

    /// User id to connection ids mapping
    user_connections: DashMap<Snowflake, HashSet<String>>,

    /// Channel to connection ids mapping
    channel_connections: DashMap<ChannelId, HashSet<String>>,
}

impl ConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_connections: DashMap::new(),
            channel_connections: DashMap::new(),
        }
    }

    /// Create a new connection manager wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    ///
    /// Identity is known at upgrade time, so the user mapping is recorded
    /// immediately.
    pub fn add_connection(
        &self,
        connection_id: String,
        user_id: Snowflake,
        nickname: String,
        sender: mpsc::Sender<ServerEvent>,
    ) -> Arc<Connection> {
        let connection = Connection::new(connection_id.clone(), user_id, nickname, sender);
        self.connections
            .insert(connection_id.clone(), connection.clone());

        self.user_connections
            .entry(user_id)
            .or_default()
            .insert(connection_id.clone());

        tracing::debug!(connection_id = %connection_id, user_id = %user_id, "Connection added");

        connection
    }

    /// Remove a connection and all of its mappings
    ///
    /// Uses `alter` + `retain` for atomic modify-and-cleanup to avoid
    /// TOCTOU races with concurrent lookups.
    pub fn remove_connection(&self, connection_id: &str) -> Option<Arc<Connection>> {
        let (_, connection) = self.connections.remove(connection_id)?;

        self.user_connections
            .alter(&connection.user_id(), |_, mut conns| {
                conns.remove(connection_id);
                conns
            });
        self.user_connections.retain(|_, conns| !conns.is_empty());

        for channel in connection.channels() {
            self.channel_connections.alter(&channel, |_, mut conns| {
                conns.remove(connection_id);
                conns
            });
        }
        self.channel_connections.retain(|_, conns| !conns.is_empty());

        tracing::debug!(connection_id = %connection_id, "Connection removed");

        Some(connection)
    }

    /// Get a connection by id
    pub fn get_connection(&self, connection_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(connection_id).map(|r| r.clone())
    }

    /// Subscribe a connection to a channel
    ///
    /// Returns the number of local connections now subscribed, or None if
    /// the connection is unknown.
    pub fn subscribe_to_channel(&self, connection_id: &str, channel: ChannelId) -> Option<usize> {
        let connection = self.connections.get(connection_id)?;
        connection.subscribe(channel);

        let mut entry = self.channel_connections.entry(channel).or_default();
        entry.insert(connection_id.to_string());
        let local_count = entry.len();

        tracing::trace!(
            connection_id = %connection_id,
            channel = %channel,
            "Connection subscribed to channel"
        );

        Some(local_count)
    }

    /// Unsubscribe a connection from a channel
    ///
    /// Returns the number of local connections still subscribed, or None if
    /// the connection is unknown.
    pub fn unsubscribe_from_channel(
        &self,
        connection_id: &str,
        channel: ChannelId,
    ) -> Option<usize> {
        let connection = self.connections.get(connection_id)?;
        connection.unsubscribe(channel);

        self.channel_connections.alter(&channel, |_, mut conns| {
            conns.remove(connection_id);
            conns
        });

        let remaining = self
            .channel_connections
            .get(&channel)
            .map_or(0, |conns| conns.len());
        self.channel_connections.retain(|_, conns| !conns.is_empty());

        tracing::trace!(
            connection_id = %connection_id,
            channel = %channel,
            "Connection unsubscribed from channel"
        );

        Some(remaining)
    }

    /// Get all connections for a user
    pub fn get_user_connections(&self, user_id: Snowflake) -> Vec<Arc<Connection>> {
        self.user_connections
            .get(&user_id)
            .map(|conns| {
                conns
                    .iter()
                    .filter_map(|cid| self.connections.get(cid).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get all connections subscribed to a channel
    pub fn get_channel_connections(&self, channel: ChannelId) -> Vec<Arc<Connection>> {
        self.channel_connections
            .get(&channel)
            .map(|conns| {
                conns
                    .iter()
                    .filter_map(|cid| self.connections.get(cid).map(|c| c.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Send an event to every connection subscribed to a channel
    ///
    /// `exclude_connection` skips one connection (everyone-but-me fan-out).
    pub async fn send_to_channel(
        &self,
        channel: ChannelId,
        event: &ServerEvent,
        exclude_connection: Option<&str>,
    ) -> usize {
        let connections = self.get_channel_connections(channel);
        let mut sent = 0;

        for conn in connections {
            if exclude_connection == Some(conn.id()) {
                continue;
            }

            if conn.send(event.clone()).await.is_ok() {
                sent += 1;
            }
        }

        tracing::trace!(
            channel = %channel,
            event = event.name(),
            sent = sent,
            "Event sent to channel connections"
        );

        sent
    }

    /// Send an event to all connections of a user
    pub async fn send_to_user(&self, user_id: Snowflake, event: &ServerEvent) -> usize {
        let connections = self.get_user_connections(user_id);
        let mut sent = 0;

        for conn in connections {
            if conn.send(event.clone()).await.is_ok() {
                sent += 1;
            }
        }

        sent
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of unique connected users
    pub fn user_count(&self) -> usize {
        self.user_connections.len()
    }

    /// Get the number of channels with local subscribers
    pub fn channel_count(&self) -> usize {
        self.channel_connections.len()
    }

    /// Check if a connection exists
    pub fn has_connection(&self, connection_id: &str) -> bool {
        self.connections.contains_key(connection_id)
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("users", &self.user_connections.len())
            .field("channels", &self.channel_connections.len())
            .finish()
    }
}
