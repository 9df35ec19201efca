//! PostgreSQL implementation of ParticipantDirectory
//!
//! The `room_participants` table is owned by the CRUD service; this layer
//! only reads it to authorize room entry.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use party_core::{ParticipantDirectory, RepoResult, Snowflake};

use super::error::map_db_error;

/// PostgreSQL implementation of ParticipantDirectory
#[derive(Clone)]
pub struct PgParticipantDirectory {
    pool: PgPool,
}

impl PgParticipantDirectory {
    /// Create a new PgParticipantDirectory
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantDirectory for PgParticipantDirectory {
    #[instrument(skip(self))]
    async fn is_durable_participant(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<bool> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM room_participants
                WHERE room_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(room_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists.0)
    }
}
