//! Session event handlers
//!
//! One handler per client event, dispatched through a single exhaustive
//! match. Failures convert to an `error` event for the originating
//! connection only; no partial state survives a rejected event.

use std::sync::Arc;

use party_core::{
    ChannelId, DomainError, ParticipantDirectory, PresenceStore, Snowflake,
};
use tracing::instrument;

use crate::broadcast::{BroadcastError, Broadcaster};
use crate::connection::Connection;
use crate::events::{
    ClientEvent, DirectMessagePayload, EnterRoomPayload, JoinDmPayload, JoinRoomPayload,
    LeaveRoomPayload, NoFriendPayload, RoomMessagePayload, ServerEvent, UserRef,
};
use crate::session::MessageService;

/// Drives the room session protocol for every connection
pub struct SessionHandler {
    presence: Arc<dyn PresenceStore>,
    participants: Arc<dyn ParticipantDirectory>,
    messages: MessageService,
    broadcaster: Arc<Broadcaster>,
}

impl SessionHandler {
    /// Create a new session handler
    pub fn new(
        presence: Arc<dyn PresenceStore>,
        participants: Arc<dyn ParticipantDirectory>,
        messages: MessageService,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            presence,
            participants,
            messages,
            broadcaster,
        }
    }

    /// Record a fresh connection as online
    pub async fn handle_connect(&self, connection: &Arc<Connection>) {
        if let Err(e) = self
            .presence
            .mark_user_online(connection.user_id(), connection.id())
            .await
        {
            tracing::error!(
                connection_id = %connection.id(),
                user_id = %connection.user_id(),
                error = %e,
                "Failed to record user online"
            );
        }
    }

    /// Handle one client event
    #[instrument(skip(self, connection, event), fields(
        connection_id = %connection.id(),
        user_id = %connection.user_id(),
        event = event.name(),
    ))]
    pub async fn handle_event(&self, connection: &Arc<Connection>, event: ClientEvent) {
        let result = match event {
            ClientEvent::JoinRoom(payload) => self.join_room(connection, payload).await,
            ClientEvent::EnterRoom(payload) => self.enter_room(connection, payload).await,
            ClientEvent::SendRoomMessage(payload) => {
                self.send_room_message(connection, payload).await
            }
            ClientEvent::LeaveRoom(payload) => self.leave_room(connection, payload).await,
            ClientEvent::JoinDm(payload) => self.join_dm(connection, payload).await,
            ClientEvent::SendDirectMessage(payload) => {
                self.send_direct_message(connection, payload).await
            }
            ClientEvent::NoFriend(payload) => self.no_friend(connection, payload).await,
        };

        if let Err(e) = result {
            tracing::debug!(error = %e, "Session event rejected");
            self.send_error(connection, &e).await;
        }
    }

    /// Reply with an `error` event for a frame that failed to parse
    pub async fn handle_invalid_frame(&self, connection: &Arc<Connection>, reason: &str) {
        tracing::debug!(
            connection_id = %connection.id(),
            reason,
            "Invalid client frame"
        );

        let event = ServerEvent::error_with("INVALID_EVENT", format!("invalid event: {reason}"));
        if connection.send(event).await.is_err() {
            tracing::trace!(connection_id = %connection.id(), "Connection gone, error not sent");
        }
    }

    /// Clean up after a physical disconnect, clean or not
    ///
    /// Best-effort: every step is attempted even if an earlier one fails,
    /// so teardown never blocks on a degraded dependency.
    pub async fn handle_disconnect(&self, connection: &Arc<Connection>) {
        let user_id = connection.user_id();
        let conn_id = connection.id();

        for channel in connection.channels() {
            if let ChannelId::Room(room_id) = channel {
                if let Err(e) = self
                    .presence
                    .remove_connection(room_id, user_id, conn_id)
                    .await
                {
                    tracing::warn!(%room_id, %user_id, error = %e, "Presence cleanup failed");
                }

                let left = ServerEvent::user_left(user_id, conn_id);
                if let Err(e) = self.broadcaster.broadcast(channel, &left, None).await {
                    tracing::warn!(%room_id, error = %e, "Leave broadcast failed");
                }
            }

            if let Err(e) = self.broadcaster.unsubscribe(conn_id, channel).await {
                tracing::warn!(%channel, error = %e, "Channel unsubscribe failed");
            }
        }

        if let Err(e) = self.presence.mark_user_offline(user_id, conn_id).await {
            tracing::warn!(%user_id, error = %e, "Failed to record user offline");
        }

        tracing::info!(connection_id = %conn_id, user_id = %user_id, "Session cleaned up");
    }

    /// `joinRoom`: open join, no durable-participant requirement
    async fn join_room(
        &self,
        connection: &Arc<Connection>,
        payload: JoinRoomPayload,
    ) -> Result<(), DomainError> {
        validate_nickname(&payload.nickname)?;
        self.join_channel(connection, payload.room_id, &payload.nickname)
            .await
    }

    /// `enterRoom`: re-entry gated on the durable participant list
    async fn enter_room(
        &self,
        connection: &Arc<Connection>,
        payload: EnterRoomPayload,
    ) -> Result<(), DomainError> {
        validate_nickname(&payload.nickname)?;

        let is_member = self
            .participants
            .is_durable_participant(payload.room_id, connection.user_id())
            .await?;
        if !is_member {
            return Err(DomainError::NotParticipant(payload.room_id));
        }

        self.join_channel(connection, payload.room_id, &payload.nickname)
            .await
    }

    /// Shared join tail: subscribe, record presence, announce
    async fn join_channel(
        &self,
        connection: &Arc<Connection>,
        room_id: Snowflake,
        nickname: &str,
    ) -> Result<(), DomainError> {
        let channel = ChannelId::Room(room_id);

        self.broadcaster
            .subscribe(connection.id(), channel)
            .await
            .map_err(broadcast_error)?;

        if let Err(e) = self
            .presence
            .add_connection(room_id, connection.user_id(), connection.id())
            .await
        {
            // Roll back the subscription so a failed join leaves no trace
            self.broadcaster
                .unsubscribe(connection.id(), channel)
                .await
                .ok();
            return Err(e.into());
        }

        let count = match self.presence.occupancy(room_id).await {
            Ok(count) => count,
            Err(e) => {
                // Unwind presence and the subscription too; a rejected join
                // leaves no partial state behind
                self.presence
                    .remove_connection(room_id, connection.user_id(), connection.id())
                    .await
                    .ok();
                self.broadcaster
                    .unsubscribe(connection.id(), channel)
                    .await
                    .ok();
                return Err(e.into());
            }
        };

        let joined = ServerEvent::user_joined(UserRef::new(connection.user_id(), nickname), count);
        self.broadcaster
            .broadcast(channel, &joined, None)
            .await
            .map_err(broadcast_error)?;

        tracing::info!(
            connection_id = %connection.id(),
            user_id = %connection.user_id(),
            %room_id,
            count,
            "User joined room"
        );

        Ok(())
    }

    /// `sendRoomMessage`: presence re-checked per message; persist, then
    /// broadcast to the whole room including the sender
    async fn send_room_message(
        &self,
        connection: &Arc<Connection>,
        payload: RoomMessagePayload,
    ) -> Result<(), DomainError> {
        let present = self
            .presence
            .is_participant(payload.room_id, connection.user_id())
            .await?;
        if !present {
            return Err(DomainError::NotParticipant(payload.room_id));
        }

        let message = self
            .messages
            .save_room_message(
                payload.room_id,
                connection.user_id(),
                payload.content,
                payload.message_type,
            )
            .await?;

        self.broadcaster
            .broadcast(
                ChannelId::Room(payload.room_id),
                &ServerEvent::room_message(message),
                None,
            )
            .await
            .map_err(broadcast_error)?;

        Ok(())
    }

    /// `leaveRoom`: withdraw presence, then announce to those remaining
    async fn leave_room(
        &self,
        connection: &Arc<Connection>,
        payload: LeaveRoomPayload,
    ) -> Result<(), DomainError> {
        let channel = ChannelId::Room(payload.room_id);

        self.presence
            .remove_connection(payload.room_id, connection.user_id(), connection.id())
            .await?;

        self.broadcaster
            .unsubscribe(connection.id(), channel)
            .await
            .map_err(broadcast_error)?;

        let left = ServerEvent::user_left(connection.user_id(), connection.id());
        self.broadcaster
            .broadcast(channel, &left, Some(connection.id()))
            .await
            .map_err(broadcast_error)?;

        tracing::info!(
            connection_id = %connection.id(),
            user_id = %connection.user_id(),
            room_id = %payload.room_id,
            "User left room"
        );

        Ok(())
    }

    /// `joinDM`: resolve (or create) the conversation and subscribe to it
    async fn join_dm(
        &self,
        connection: &Arc<Connection>,
        payload: JoinDmPayload,
    ) -> Result<(), DomainError> {
        let conversation = self
            .messages
            .resolve_conversation(connection.user_id(), payload.receiver_id)
            .await?;

        self.broadcaster
            .subscribe(connection.id(), ChannelId::Conversation(conversation.id))
            .await
            .map_err(broadcast_error)?;

        tracing::debug!(
            connection_id = %connection.id(),
            conversation_id = %conversation.id,
            "Connection joined conversation"
        );

        Ok(())
    }

    /// `sendDirectMessage`: persist, then deliver to everyone in the
    /// conversation except the sender's own connection
    async fn send_direct_message(
        &self,
        connection: &Arc<Connection>,
        payload: DirectMessagePayload,
    ) -> Result<(), DomainError> {
        let (conversation, message) = self
            .messages
            .save_direct_message(
                connection.user_id(),
                payload.receiver_id,
                payload.content,
                payload.message_type,
            )
            .await?;

        let sender = UserRef::new(connection.user_id(), payload.from_nickname);
        self.broadcaster
            .broadcast(
                ChannelId::Conversation(conversation.id),
                &ServerEvent::direct_message(sender, message),
                Some(connection.id()),
            )
            .await
            .map_err(broadcast_error)?;

        Ok(())
    }

    /// `noFriend`: detach this connection from a conversation it no longer
    /// belongs in
    async fn no_friend(
        &self,
        connection: &Arc<Connection>,
        payload: NoFriendPayload,
    ) -> Result<(), DomainError> {
        let conversation = self
            .messages
            .find_conversation(payload.user_id_1, payload.user_id_2)
            .await?
            .ok_or(DomainError::ConversationNotFound(
                payload.user_id_1,
                payload.user_id_2,
            ))?;

        self.broadcaster
            .unsubscribe(connection.id(), ChannelId::Conversation(conversation.id))
            .await
            .map_err(broadcast_error)?;

        Ok(())
    }

    async fn send_error(&self, connection: &Arc<Connection>, err: &DomainError) {
        if connection.send(ServerEvent::error(err)).await.is_err() {
            tracing::trace!(
                connection_id = %connection.id(),
                "Connection gone, error not sent"
            );
        }
    }
}

fn validate_nickname(nickname: &str) -> Result<(), DomainError> {
    if nickname.trim().is_empty() {
        return Err(DomainError::ValidationError("nickname is empty".to_string()));
    }
    Ok(())
}

fn broadcast_error(e: BroadcastError) -> DomainError {
    DomainError::InternalError(e.to_string())
}
