//! Event dispatcher
//!
//! Receives events from Redis Pub/Sub and replays them into the local
//! connections subscribed to the target channel. One dispatcher loop per
//! process preserves per-channel delivery order.

use crate::connection::ConnectionManager;
use crate::events::ServerEvent;
use party_cache::{PubSubChannel, ReceivedMessage, Subscriber, SubscriberConfig, SubscriberError};
use party_core::ChannelId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Configuration for the event dispatcher
#[derive(Debug, Clone)]
pub struct EventDispatcherConfig {
    /// Redis URL
    pub redis_url: String,
    /// Broadcast buffer size
    pub broadcast_buffer: usize,
    /// Reconnection delay in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for EventDispatcherConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

/// Routes Redis Pub/Sub messages to local WebSocket connections
pub struct EventDispatcher {
    /// Connection manager for delivery
    connection_manager: Arc<ConnectionManager>,
    /// Redis subscriber
    subscriber: Subscriber,
    /// Whether the dispatcher loop is running
    running: Arc<AtomicBool>,
}

impl EventDispatcher {
    /// Create a new event dispatcher
    #[must_use]
    pub fn new(config: EventDispatcherConfig, connection_manager: Arc<ConnectionManager>) -> Self {
        let subscriber = Subscriber::new(SubscriberConfig {
            redis_url: config.redis_url,
            broadcast_buffer: config.broadcast_buffer,
            reconnect_delay_ms: config.reconnect_delay_ms,
        });

        Self {
            connection_manager,
            subscriber,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribe this process to a channel's topic
    pub async fn subscribe_channel(&self, channel: ChannelId) -> Result<(), SubscriberError> {
        self.subscriber
            .subscribe(&[PubSubChannel::from(channel)])
            .await
    }

    /// Unsubscribe this process from a channel's topic
    pub async fn unsubscribe_channel(&self, channel: ChannelId) -> Result<(), SubscriberError> {
        self.subscriber
            .unsubscribe(&[PubSubChannel::from(channel)])
            .await
    }

    /// Start the dispatcher loop in a background task
    pub fn start(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Event dispatcher is already running");
            return;
        }

        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.run().await;
        });

        tracing::info!("Event dispatcher started");
    }

    /// Stop the event dispatcher
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.subscriber.shutdown().await.ok();
        tracing::info!("Event dispatcher stopped");
    }

    /// Run the dispatch loop
    async fn run(&self) {
        let mut receiver = self.subscriber.receiver();

        while self.running.load(Ordering::SeqCst) {
            match receiver.recv().await {
                Ok(msg) => {
                    self.handle_message(msg).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "Event dispatcher lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::warn!("Event dispatcher channel closed");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Event dispatcher loop ended");
    }

    /// Handle a received message from Redis
    async fn handle_message(&self, msg: ReceivedMessage) {
        let Some(event) = &msg.event else {
            tracing::debug!(channel = %msg.channel, "Received non-event message, ignoring");
            return;
        };

        let Some(channel) = msg.channel.channel_id() else {
            tracing::trace!(channel = %msg.channel, "Topic has no local routing, ignoring");
            return;
        };

        let server_event: ServerEvent = match serde_json::from_value(event.data.clone()) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(
                    channel = %msg.channel,
                    event_type = %event.event_type,
                    error = %e,
                    "Failed to decode event payload"
                );
                return;
            }
        };

        let sent = self
            .connection_manager
            .send_to_channel(channel, &server_event, event.exclude_connection.as_deref())
            .await;

        tracing::trace!(
            channel = %channel,
            event_type = %event.event_type,
            sent = sent,
            "Event dispatched to channel"
        );
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("running", &self.running.load(Ordering::SeqCst))
            .finish()
    }
}
