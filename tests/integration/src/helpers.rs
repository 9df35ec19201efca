//! Session test harness
//!
//! Wires a `SessionHandler` over the in-memory stores and a local
//! broadcaster, mirroring the production wiring minus the sockets.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use party_cache::MemoryPresenceStore;
use party_core::{MessageKind, PresenceStore, Snowflake, SnowflakeGenerator};
use party_gateway::broadcast::Broadcaster;
use party_gateway::connection::{Connection, ConnectionManager};
use party_gateway::events::{
    ClientEvent, DirectMessagePayload, EnterRoomPayload, JoinDmPayload, JoinRoomPayload,
    LeaveRoomPayload, NoFriendPayload, RoomMessagePayload, ServerEvent,
};
use party_gateway::session::{MessageService, SessionHandler};
use tokio::sync::mpsc;

use crate::fixtures::{
    FlakyPresenceStore, MemoryConversationRepository, MemoryMessageRepository,
    StaticParticipantDirectory,
};

const EVENT_BUFFER_SIZE: usize = 100;
const RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Fully wired session layer over in-memory stores
pub struct TestHarness {
    pub manager: Arc<ConnectionManager>,
    pub session: Arc<SessionHandler>,
    pub presence: Arc<MemoryPresenceStore>,
    pub messages: Arc<MemoryMessageRepository>,
    pub conversations: Arc<MemoryConversationRepository>,
    pub participants: Arc<StaticParticipantDirectory>,
    next_conn: AtomicU64,
}

impl TestHarness {
    #[must_use]
    pub fn new() -> Self {
        let presence = Arc::new(MemoryPresenceStore::new());
        Self::with_session_store(presence.clone(), presence)
    }

    /// Harness with a flaky presence store wired into the session layer,
    /// returned alongside the handle that controls the outages
    #[must_use]
    pub fn with_presence_outages() -> (Self, Arc<FlakyPresenceStore>) {
        let presence = Arc::new(MemoryPresenceStore::new());
        let flaky = Arc::new(FlakyPresenceStore::new(presence.clone()));
        let harness = Self::with_session_store(flaky.clone(), presence);
        (harness, flaky)
    }

    /// Build a harness whose session layer sees presence through `store`,
    /// while assertions keep direct access to the in-memory state
    fn with_session_store(
        store: Arc<dyn PresenceStore>,
        presence: Arc<MemoryPresenceStore>,
    ) -> Self {
        let ids = Arc::new(SnowflakeGenerator::new(0));
        let messages = Arc::new(MemoryMessageRepository::new());
        let conversations = Arc::new(MemoryConversationRepository::new(ids.clone()));
        let participants = Arc::new(StaticParticipantDirectory::new());

        let manager = ConnectionManager::new_shared();
        let broadcaster = Arc::new(Broadcaster::local(manager.clone()));
        let service = MessageService::new(messages.clone(), conversations.clone(), ids);
        let session = Arc::new(SessionHandler::new(
            store,
            participants.clone(),
            service,
            broadcaster,
        ));

        Self {
            manager,
            session,
            presence,
            messages,
            conversations,
            participants,
            next_conn: AtomicU64::new(1),
        }
    }

    /// Open a connection for a user, as the WebSocket handler would
    pub async fn connect(&self, user_id: i64, nickname: &str) -> TestClient {
        let conn_id = format!("conn-{}", self.next_conn.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = mpsc::channel(EVENT_BUFFER_SIZE);
        let connection = self.manager.add_connection(
            conn_id,
            Snowflake::new(user_id),
            nickname.to_string(),
            tx,
        );
        self.session.handle_connect(&connection).await;

        TestClient {
            session: self.session.clone(),
            manager: self.manager.clone(),
            connection,
            rx,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// One connected client with its outbound event queue
pub struct TestClient {
    session: Arc<SessionHandler>,
    manager: Arc<ConnectionManager>,
    pub connection: Arc<Connection>,
    rx: mpsc::Receiver<ServerEvent>,
}

impl TestClient {
    #[must_use]
    pub fn id(&self) -> &str {
        self.connection.id()
    }

    #[must_use]
    pub fn user_id(&self) -> Snowflake {
        self.connection.user_id()
    }

    /// Dispatch one client event through the session layer
    pub async fn send(&self, event: ClientEvent) {
        self.session.handle_event(&self.connection, event).await;
    }

    /// Feed a raw text frame through the same parse path the socket uses
    pub async fn send_frame(&self, text: &str) {
        match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => self.session.handle_event(&self.connection, event).await,
            Err(e) => {
                self.session
                    .handle_invalid_frame(&self.connection, &e.to_string())
                    .await;
            }
        }
    }

    /// Next queued event, failing the test if none arrives in time
    pub async fn recv(&mut self) -> ServerEvent {
        tokio::time::timeout(RECV_TIMEOUT, self.rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("connection channel closed")
    }

    /// Next queued event without waiting
    pub fn try_recv(&mut self) -> Option<ServerEvent> {
        self.rx.try_recv().ok()
    }

    /// Drop everything currently queued
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Tear the connection down the way the socket task does on close
    pub async fn disconnect(&self) {
        self.session.handle_disconnect(&self.connection).await;
        self.manager.remove_connection(self.connection.id());
    }
}

/// Assert an event is an `error` carrying the expected code
pub fn assert_error_code(event: &ServerEvent, code: &str) {
    match event {
        ServerEvent::Error(payload) => assert_eq!(payload.code, code),
        other => panic!("expected error event, got {other:?}"),
    }
}

pub fn join_room(room_id: i64, nickname: &str) -> ClientEvent {
    ClientEvent::JoinRoom(JoinRoomPayload {
        room_id: Snowflake::new(room_id),
        nickname: nickname.to_string(),
    })
}

pub fn enter_room(room_id: i64, nickname: &str) -> ClientEvent {
    ClientEvent::EnterRoom(EnterRoomPayload {
        room_id: Snowflake::new(room_id),
        nickname: nickname.to_string(),
    })
}

pub fn room_message(room_id: i64, nickname: &str, content: &str) -> ClientEvent {
    ClientEvent::SendRoomMessage(RoomMessagePayload {
        room_id: Snowflake::new(room_id),
        nickname: nickname.to_string(),
        content: content.to_string(),
        message_type: MessageKind::General,
    })
}

pub fn leave_room(room_id: i64) -> ClientEvent {
    ClientEvent::LeaveRoom(LeaveRoomPayload {
        room_id: Snowflake::new(room_id),
    })
}

pub fn join_dm(receiver_id: i64) -> ClientEvent {
    ClientEvent::JoinDm(JoinDmPayload {
        receiver_id: Snowflake::new(receiver_id),
    })
}

pub fn direct_message(receiver_id: i64, from_nickname: &str, content: &str) -> ClientEvent {
    ClientEvent::SendDirectMessage(DirectMessagePayload {
        receiver_id: Snowflake::new(receiver_id),
        from_nickname: from_nickname.to_string(),
        content: content.to_string(),
        message_type: MessageKind::General,
    })
}

pub fn no_friend(user_id_1: i64, user_id_2: i64) -> ClientEvent {
    ClientEvent::NoFriend(NoFriendPayload {
        user_id_1: Snowflake::new(user_id_1),
        user_id_2: Snowflake::new(user_id_2),
    })
}
