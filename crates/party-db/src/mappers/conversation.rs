//! Conversation entity <-> model mapper

use party_core::{Conversation, Snowflake};

use crate::models::ConversationModel;

/// Convert ConversationModel to Conversation entity
impl From<ConversationModel> for Conversation {
    fn from(model: ConversationModel) -> Self {
        Conversation {
            id: Snowflake::new(model.id),
            user_low: Snowflake::new(model.user_low),
            user_high: Snowflake::new(model.user_high),
            created_at: model.created_at,
        }
    }
}
