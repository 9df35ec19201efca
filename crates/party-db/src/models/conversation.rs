//! Conversation database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for conversations table
///
/// The `(user_low, user_high)` pair carries a unique constraint; rows are
/// always stored with `user_low < user_high`.
#[derive(Debug, Clone, FromRow)]
pub struct ConversationModel {
    pub id: i64,
    pub user_low: i64,
    pub user_high: i64,
    pub created_at: DateTime<Utc>,
}
