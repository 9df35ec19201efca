//! Channel broadcaster
//!
//! Single entry point for delivering an event to everyone subscribed to a
//! channel. In Redis mode events are published to the channel's topic and
//! delivered (locally and remotely) by each process's dispatcher, which
//! keeps per-channel ordering identical everywhere. Local mode skips Redis
//! and fans out directly; single-process deployments and tests use it.

use std::sync::Arc;

use party_cache::{PubSubChannel, PubSubEvent, Publisher, RedisPoolError, SubscriberError};
use party_core::ChannelId;

use crate::broadcast::EventDispatcher;
use crate::connection::ConnectionManager;
use crate::events::ServerEvent;

/// Error type for broadcast operations
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    #[error("unknown connection: {0}")]
    UnknownConnection(String),

    #[error("failed to publish event: {0}")]
    Publish(#[from] RedisPoolError),

    #[error("failed to manage topic subscription: {0}")]
    Subscription(#[from] SubscriberError),

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

struct RedisFanOut {
    publisher: Publisher,
    dispatcher: Arc<EventDispatcher>,
}

/// Fan-out broadcaster over local connections and the Redis fabric
pub struct Broadcaster {
    manager: Arc<ConnectionManager>,
    redis: Option<RedisFanOut>,
}

impl Broadcaster {
    /// Create a local-only broadcaster (single process, no Redis)
    #[must_use]
    pub fn local(manager: Arc<ConnectionManager>) -> Self {
        Self {
            manager,
            redis: None,
        }
    }

    /// Create a broadcaster that rides the Redis pub/sub fabric
    #[must_use]
    pub fn with_redis(
        manager: Arc<ConnectionManager>,
        publisher: Publisher,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            manager,
            redis: Some(RedisFanOut {
                publisher,
                dispatcher,
            }),
        }
    }

    /// Subscribe a connection to a channel
    ///
    /// The first local subscriber also subscribes this process to the
    /// channel's Redis topic.
    pub async fn subscribe(
        &self,
        connection_id: &str,
        channel: ChannelId,
    ) -> Result<(), BroadcastError> {
        let local_count = self
            .manager
            .subscribe_to_channel(connection_id, channel)
            .ok_or_else(|| BroadcastError::UnknownConnection(connection_id.to_string()))?;

        if local_count == 1 {
            if let Some(redis) = &self.redis {
                redis
                    .dispatcher
                    .subscribe_channel(channel)
                    .await
                    .map_err(BroadcastError::Subscription)?;
            }
        }

        Ok(())
    }

    /// Unsubscribe a connection from a channel
    ///
    /// When the last local subscriber leaves, the process drops the
    /// channel's Redis topic too.
    pub async fn unsubscribe(
        &self,
        connection_id: &str,
        channel: ChannelId,
    ) -> Result<(), BroadcastError> {
        let remaining = self
            .manager
            .unsubscribe_from_channel(connection_id, channel)
            .ok_or_else(|| BroadcastError::UnknownConnection(connection_id.to_string()))?;

        if remaining == 0 {
            if let Some(redis) = &self.redis {
                redis
                    .dispatcher
                    .unsubscribe_channel(channel)
                    .await
                    .map_err(BroadcastError::Subscription)?;
            }
        }

        Ok(())
    }

    /// Deliver an event to every connection subscribed to a channel
    ///
    /// `exclude_connection` implements everyone-but-me fan-out; connection
    /// ids are globally unique, so exclusion works across processes.
    pub async fn broadcast(
        &self,
        channel: ChannelId,
        event: &ServerEvent,
        exclude_connection: Option<&str>,
    ) -> Result<(), BroadcastError> {
        match &self.redis {
            Some(redis) => {
                let mut pubsub_event =
                    PubSubEvent::new(event.name(), serde_json::to_value(event)?);
                if let Some(conn_id) = exclude_connection {
                    pubsub_event = pubsub_event.excluding(conn_id);
                }

                redis
                    .publisher
                    .publish(&PubSubChannel::from(channel), &pubsub_event)
                    .await?;
            }
            None => {
                self.manager
                    .send_to_channel(channel, event, exclude_connection)
                    .await;
            }
        }

        Ok(())
    }

    /// Get the connection manager backing this broadcaster
    #[must_use]
    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }
}
