//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use party_core::{ChatMessage, MessageRepository, RepoResult};

use crate::mappers::channel_parts;

use super::error::map_db_error;

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self, message), fields(message_id = %message.id, channel = %message.channel))]
    async fn create(&self, message: &ChatMessage) -> RepoResult<()> {
        let (channel_kind, channel_id) = channel_parts(message.channel);

        sqlx::query(
            r#"
            INSERT INTO messages (id, channel_kind, channel_id, sender_id, content, kind, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id.into_inner())
        .bind(channel_kind)
        .bind(channel_id)
        .bind(message.sender_id.into_inner())
        .bind(&message.content)
        .bind(message.kind.to_string())
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
