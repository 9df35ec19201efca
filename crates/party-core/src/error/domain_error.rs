//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Room not found: {0}")]
    RoomNotFound(Snowflake),

    #[error("Conversation not found between {0} and {1}")]
    ConversationNotFound(Snowflake, Snowflake),

    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a participant of room {0}")]
    NotParticipant(Snowflake),

    #[error("Cannot open a conversation with yourself")]
    SelfConversation,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Presence store unavailable: {0}")]
    PresenceUnavailable(String),

    #[error("Message store unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for client-visible error events
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoomNotFound(_) => "UNKNOWN_ROOM",
            Self::ConversationNotFound(..) => "UNKNOWN_CONVERSATION",
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::NotParticipant(_) => "NOT_PARTICIPANT",
            Self::SelfConversation => "SELF_CONVERSATION",
            Self::PresenceUnavailable(_) => "PRESENCE_UNAVAILABLE",
            Self::PersistenceUnavailable(_) => "PERSISTENCE_UNAVAILABLE",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RoomNotFound(_) | Self::ConversationNotFound(..) | Self::UserNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::ContentTooLong { .. })
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotParticipant(_) | Self::SelfConversation)
    }

    /// Check if this came from an unavailable dependency
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::PresenceUnavailable(_) | Self::PersistenceUnavailable(_)
        )
    }
}
