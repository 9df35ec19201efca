//! PostgreSQL implementation of ConversationRepository

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use party_core::{
    Conversation, ConversationRepository, RepoResult, Snowflake, SnowflakeGenerator,
};

use crate::models::ConversationModel;

use super::error::{conversation_not_found, map_db_error};

/// PostgreSQL implementation of ConversationRepository
#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
    id_generator: Arc<SnowflakeGenerator>,
}

impl PgConversationRepository {
    /// Create a new PgConversationRepository
    pub fn new(pool: PgPool, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self { pool, id_generator }
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    /// Conditional insert followed by an unconditional select.
    ///
    /// Two first-contact calls may race; the unique constraint on
    /// `(user_low, user_high)` guarantees at most one row lands, and the
    /// follow-up select returns whichever row won.
    #[instrument(skip(self))]
    async fn get_or_create(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
    ) -> RepoResult<Conversation> {
        let (low, high) = Conversation::canonical_pair(user_a, user_b);
        let candidate_id = self.id_generator.generate();

        sqlx::query(
            r#"
            INSERT INTO conversations (id, user_low, user_high, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_low, user_high) DO NOTHING
            "#,
        )
        .bind(candidate_id.into_inner())
        .bind(low.into_inner())
        .bind(high.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        let row = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT id, user_low, user_high, created_at
            FROM conversations
            WHERE user_low = $1 AND user_high = $2
            "#,
        )
        .bind(low.into_inner())
        .bind(high.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| conversation_not_found(user_a, user_b))?;

        Ok(Conversation::from(row))
    }

    #[instrument(skip(self))]
    async fn find_by_pair(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
    ) -> RepoResult<Option<Conversation>> {
        let (low, high) = Conversation::canonical_pair(user_a, user_b);

        let row = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT id, user_low, user_high, created_at
            FROM conversations
            WHERE user_low = $1 AND user_high = $2
            "#,
        )
        .bind(low.into_inner())
        .bind(high.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Conversation::from))
    }
}
