//! Message persistence gateway
//!
//! Accepts raw message input from session handlers, validates it, assigns
//! an id, and writes through the repositories. A message either persists
//! here or the caller never broadcasts it.

use std::sync::Arc;

use party_core::{
    ChannelId, ChatMessage, Conversation, ConversationRepository, DomainError, MessageKind,
    MessageRepository, RepoResult, Snowflake, SnowflakeGenerator,
};

/// Maximum message content length in characters
pub const MAX_CONTENT_LEN: usize = 2000;

/// Persistence gateway over the message and conversation repositories
#[derive(Clone)]
pub struct MessageService {
    messages: Arc<dyn MessageRepository>,
    conversations: Arc<dyn ConversationRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl MessageService {
    /// Create a new message service
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        conversations: Arc<dyn ConversationRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            messages,
            conversations,
            id_generator,
        }
    }

    /// Persist a room message and return the stored record
    pub async fn save_room_message(
        &self,
        room_id: Snowflake,
        sender_id: Snowflake,
        content: String,
        kind: MessageKind,
    ) -> RepoResult<ChatMessage> {
        let content = validate_content(content)?;
        let message = ChatMessage::new(
            self.id_generator.generate(),
            ChannelId::Room(room_id),
            sender_id,
            content,
            kind,
        );

        self.messages.create(&message).await?;
        Ok(message)
    }

    /// Resolve the conversation for a user pair, creating it if absent
    pub async fn resolve_conversation(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
    ) -> RepoResult<Conversation> {
        if user_a == user_b {
            return Err(DomainError::SelfConversation);
        }
        self.conversations.get_or_create(user_a, user_b).await
    }

    /// Look up an existing conversation without creating one
    pub async fn find_conversation(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
    ) -> RepoResult<Option<Conversation>> {
        if user_a == user_b {
            return Err(DomainError::SelfConversation);
        }
        self.conversations.find_by_pair(user_a, user_b).await
    }

    /// Persist a direct message, resolving the conversation first
    pub async fn save_direct_message(
        &self,
        sender_id: Snowflake,
        receiver_id: Snowflake,
        content: String,
        kind: MessageKind,
    ) -> RepoResult<(Conversation, ChatMessage)> {
        let content = validate_content(content)?;
        let conversation = self.resolve_conversation(sender_id, receiver_id).await?;

        let message = ChatMessage::new(
            self.id_generator.generate(),
            ChannelId::Conversation(conversation.id),
            sender_id,
            content,
            kind,
        );

        self.messages.create(&message).await?;
        Ok((conversation, message))
    }
}

fn validate_content(content: String) -> RepoResult<String> {
    if content.trim().is_empty() {
        return Err(DomainError::ValidationError(
            "message content is empty".to_string(),
        ));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(DomainError::ContentTooLong {
            max: MAX_CONTENT_LEN,
        });
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_validation() {
        assert!(validate_content("hello".to_string()).is_ok());
        assert!(matches!(
            validate_content("   ".to_string()),
            Err(DomainError::ValidationError(_))
        ));
        assert!(matches!(
            validate_content("x".repeat(MAX_CONTENT_LEN + 1)),
            Err(DomainError::ContentTooLong { .. })
        ));
    }
}
