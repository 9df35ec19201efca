//! Session protocol integration tests
//!
//! Exercise the gateway session layer end to end over in-memory stores:
//! joins, presence, fan-out, direct messages, and disconnect cleanup.
//!
//! Run with: cargo test -p integration-tests --test session_tests

use integration_tests::{
    assert_error_code, direct_message, enter_room, join_dm, join_room, leave_room, no_friend,
    room_message, TestHarness,
};
use party_core::{ChannelId, PresenceStore, Snowflake};
use party_gateway::events::ServerEvent;
use party_gateway::session::MAX_CONTENT_LEN;

// ============================================================================
// Room Join Tests
// ============================================================================

#[tokio::test]
async fn test_join_announces_to_everyone_in_room() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;
    let mut bob = harness.connect(2, "bob").await;

    alice.send(join_room(42, "alice")).await;
    match alice.recv().await {
        ServerEvent::UserJoined(payload) => {
            assert_eq!(payload.user.id, Snowflake::new(1));
            assert_eq!(payload.user.nickname, "alice");
            assert_eq!(payload.count, 1);
        }
        other => panic!("expected userJoined, got {other:?}"),
    }

    bob.send(join_room(42, "bob")).await;
    match alice.recv().await {
        ServerEvent::UserJoined(payload) => {
            assert_eq!(payload.user.nickname, "bob");
            assert_eq!(payload.count, 2);
        }
        other => panic!("expected userJoined, got {other:?}"),
    }
    // The joiner sees their own announcement too
    match bob.recv().await {
        ServerEvent::UserJoined(payload) => assert_eq!(payload.count, 2),
        other => panic!("expected userJoined, got {other:?}"),
    }
}

#[tokio::test]
async fn test_enter_room_requires_durable_membership() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;
    let room = Snowflake::new(42);

    alice.send(enter_room(42, "alice")).await;
    assert_error_code(&alice.recv().await, "NOT_PARTICIPANT");
    assert!(!alice.connection.is_subscribed_to(ChannelId::Room(room)));
    assert_eq!(harness.presence.occupancy(room).await.unwrap(), 0);

    // Once the durable membership exists, re-entry succeeds
    harness.participants.grant(room, Snowflake::new(1));
    alice.send(enter_room(42, "alice")).await;
    match alice.recv().await {
        ServerEvent::UserJoined(payload) => assert_eq!(payload.count, 1),
        other => panic!("expected userJoined, got {other:?}"),
    }
    assert!(alice.connection.is_subscribed_to(ChannelId::Room(room)));
}

#[tokio::test]
async fn test_join_room_needs_no_durable_membership() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;

    alice.send(join_room(42, "alice")).await;
    assert!(matches!(alice.recv().await, ServerEvent::UserJoined(_)));
}

#[tokio::test]
async fn test_failed_join_leaves_no_partial_state() {
    let (harness, outages) = TestHarness::with_presence_outages();
    let mut alice = harness.connect(1, "alice").await;
    let room = Snowflake::new(42);

    outages.fail_occupancy(true);
    alice.send(join_room(42, "alice")).await;
    assert_error_code(&alice.recv().await, "PRESENCE_UNAVAILABLE");

    // Subscription and presence are both unwound on the failed join
    assert!(!alice.connection.is_subscribed_to(ChannelId::Room(room)));
    assert!(!harness
        .presence
        .is_participant(room, Snowflake::new(1))
        .await
        .unwrap());
    assert_eq!(harness.presence.occupancy(room).await.unwrap(), 0);

    // A retry after the store recovers joins cleanly
    outages.fail_occupancy(false);
    alice.send(join_room(42, "alice")).await;
    match alice.recv().await {
        ServerEvent::UserJoined(payload) => assert_eq!(payload.count, 1),
        other => panic!("expected userJoined, got {other:?}"),
    }
}

// ============================================================================
// Room Message Tests
// ============================================================================

#[tokio::test]
async fn test_room_message_reaches_all_and_persists() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;
    let mut bob = harness.connect(2, "bob").await;

    alice.send(join_room(42, "alice")).await;
    bob.send(join_room(42, "bob")).await;
    alice.drain();
    bob.drain();

    alice.send(room_message(42, "alice", "movie starts now")).await;

    for client in [&mut alice, &mut bob] {
        match client.recv().await {
            ServerEvent::ReceiveRoomMessage(payload) => {
                assert_eq!(payload.data.content, "movie starts now");
                assert_eq!(payload.data.sender_id, Snowflake::new(1));
            }
            other => panic!("expected receiveRoomMessage, got {other:?}"),
        }
    }

    let stored = harness
        .messages
        .messages_in(ChannelId::Room(Snowflake::new(42)));
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content, "movie starts now");
}

#[tokio::test]
async fn test_send_without_presence_is_rejected() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;
    let mut mallory = harness.connect(3, "mallory").await;

    alice.send(join_room(42, "alice")).await;
    alice.drain();

    mallory.send(room_message(42, "mallory", "let me in")).await;

    // Error goes to the sender only; nothing persists, nothing fans out
    assert_error_code(&mallory.recv().await, "NOT_PARTICIPANT");
    assert!(alice.try_recv().is_none());
    assert_eq!(harness.messages.total(), 0);
}

#[tokio::test]
async fn test_message_content_is_validated() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;

    alice.send(join_room(42, "alice")).await;
    alice.drain();

    alice.send(room_message(42, "alice", "   ")).await;
    assert_error_code(&alice.recv().await, "VALIDATION_ERROR");

    let oversized = "x".repeat(MAX_CONTENT_LEN + 1);
    alice.send(room_message(42, "alice", &oversized)).await;
    assert_error_code(&alice.recv().await, "CONTENT_TOO_LONG");

    assert_eq!(harness.messages.total(), 0);
}

#[tokio::test]
async fn test_messages_arrive_in_send_order() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;
    let mut bob = harness.connect(2, "bob").await;

    alice.send(join_room(42, "alice")).await;
    bob.send(join_room(42, "bob")).await;
    alice.drain();
    bob.drain();

    for i in 1..=5 {
        alice
            .send(room_message(42, "alice", &format!("message {i}")))
            .await;
    }

    for i in 1..=5 {
        match bob.recv().await {
            ServerEvent::ReceiveRoomMessage(payload) => {
                assert_eq!(payload.data.content, format!("message {i}"));
            }
            other => panic!("expected receiveRoomMessage, got {other:?}"),
        }
    }
}

// ============================================================================
// Leave and Disconnect Tests
// ============================================================================

#[tokio::test]
async fn test_leave_room_announces_to_others() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;
    let mut bob = harness.connect(2, "bob").await;
    let room = Snowflake::new(42);

    alice.send(join_room(42, "alice")).await;
    bob.send(join_room(42, "bob")).await;
    alice.drain();
    bob.drain();

    alice.send(leave_room(42)).await;

    match bob.recv().await {
        ServerEvent::UserLeft(payload) => {
            assert_eq!(payload.user_id, Snowflake::new(1));
            assert_eq!(payload.socket_id, alice.id());
        }
        other => panic!("expected userLeft, got {other:?}"),
    }

    // The leaver gets no echo and is fully withdrawn
    assert!(alice.try_recv().is_none());
    assert!(!alice.connection.is_subscribed_to(ChannelId::Room(room)));
    assert!(!harness
        .presence
        .is_participant(room, Snowflake::new(1))
        .await
        .unwrap());
    assert_eq!(harness.presence.occupancy(room).await.unwrap(), 1);
}

#[tokio::test]
async fn test_disconnect_cleans_up_every_room() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;
    let mut bob = harness.connect(2, "bob").await;

    alice.send(join_room(42, "alice")).await;
    alice.send(join_room(43, "alice")).await;
    bob.send(join_room(42, "bob")).await;
    alice.drain();
    bob.drain();

    alice.disconnect().await;

    match bob.recv().await {
        ServerEvent::UserLeft(payload) => assert_eq!(payload.user_id, Snowflake::new(1)),
        other => panic!("expected userLeft, got {other:?}"),
    }

    assert_eq!(
        harness.presence.occupancy(Snowflake::new(42)).await.unwrap(),
        1
    );
    assert_eq!(
        harness.presence.occupancy(Snowflake::new(43)).await.unwrap(),
        0
    );
    assert!(!harness.presence.is_online(Snowflake::new(1)).await.unwrap());
    assert_eq!(harness.manager.connection_count(), 1);
}

#[tokio::test]
async fn test_occupancy_counts_connections_not_users() {
    let harness = TestHarness::new();
    let mut first = harness.connect(1, "alice").await;
    let mut second = harness.connect(1, "alice").await;
    let room = Snowflake::new(42);

    first.send(join_room(42, "alice")).await;
    second.send(join_room(42, "alice")).await;
    first.drain();
    second.drain();

    assert_eq!(harness.presence.occupancy(room).await.unwrap(), 2);

    // Closing one tab leaves the user present through the other
    first.send(leave_room(42)).await;
    assert_eq!(harness.presence.occupancy(room).await.unwrap(), 1);
    assert!(harness
        .presence
        .is_participant(room, Snowflake::new(1))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_user_online_until_last_connection_closes() {
    let harness = TestHarness::new();
    let first = harness.connect(1, "alice").await;
    let second = harness.connect(1, "alice").await;
    let user = Snowflake::new(1);

    assert!(harness.presence.is_online(user).await.unwrap());

    first.disconnect().await;
    assert!(harness.presence.is_online(user).await.unwrap());

    second.disconnect().await;
    assert!(!harness.presence.is_online(user).await.unwrap());
}

// ============================================================================
// Direct Message Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_dm_resolution_converges() {
    let harness = TestHarness::new();
    let alice = harness.connect(1, "alice").await;
    let bob = harness.connect(2, "bob").await;

    // First contact from both sides at once must yield one conversation
    tokio::join!(alice.send(join_dm(2)), bob.send(join_dm(1)));

    assert_eq!(harness.conversations.len(), 1);
    let conversation = harness
        .conversations
        .find(Snowflake::new(1), Snowflake::new(2))
        .expect("conversation should exist");

    let channel = ChannelId::Conversation(conversation.id);
    assert!(alice.connection.is_subscribed_to(channel));
    assert!(bob.connection.is_subscribed_to(channel));
}

#[tokio::test]
async fn test_direct_message_skips_senders_connection() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;
    let mut bob = harness.connect(2, "bob").await;

    alice.send(join_dm(2)).await;
    bob.send(join_dm(1)).await;

    alice.send(direct_message(2, "alice", "you up?")).await;

    match bob.recv().await {
        ServerEvent::ReceiveDirectMessage(payload) => {
            assert_eq!(payload.sender.nickname, "alice");
            assert_eq!(payload.message.content, "you up?");
        }
        other => panic!("expected receiveDirectMessage, got {other:?}"),
    }
    assert!(alice.try_recv().is_none());

    let conversation = harness
        .conversations
        .find(Snowflake::new(1), Snowflake::new(2))
        .expect("conversation should exist");
    let stored = harness
        .messages
        .messages_in(ChannelId::Conversation(conversation.id));
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_dm_to_self_is_rejected() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;

    alice.send(join_dm(1)).await;
    assert_error_code(&alice.recv().await, "SELF_CONVERSATION");
    assert!(harness.conversations.is_empty());
}

#[tokio::test]
async fn test_no_friend_detaches_from_conversation() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;
    let mut bob = harness.connect(2, "bob").await;

    alice.send(join_dm(2)).await;
    bob.send(join_dm(1)).await;

    bob.send(no_friend(1, 2)).await;

    let conversation = harness
        .conversations
        .find(Snowflake::new(1), Snowflake::new(2))
        .expect("conversation should exist");
    assert!(!bob
        .connection
        .is_subscribed_to(ChannelId::Conversation(conversation.id)));

    // Messages no longer reach the detached side
    alice.send(direct_message(2, "alice", "hello?")).await;
    assert!(bob.try_recv().is_none());
    assert!(alice.try_recv().is_none());
}

#[tokio::test]
async fn test_no_friend_on_unknown_pair_errors() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;

    alice.send(no_friend(1, 99)).await;
    assert_error_code(&alice.recv().await, "UNKNOWN_CONVERSATION");
}

// ============================================================================
// Protocol Error Tests
// ============================================================================

#[tokio::test]
async fn test_invalid_frames_answered_with_error() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;

    alice
        .send_frame(r#"{"event":"selfDestruct","data":{}}"#)
        .await;
    assert_error_code(&alice.recv().await, "INVALID_EVENT");

    alice.send_frame("not json at all").await;
    assert_error_code(&alice.recv().await, "INVALID_EVENT");

    // The connection stays usable after a bad frame
    alice
        .send_frame(r#"{"event":"joinRoom","data":{"roomId":"42","nickname":"alice"}}"#)
        .await;
    assert!(matches!(alice.recv().await, ServerEvent::UserJoined(_)));
}

#[tokio::test]
async fn test_empty_nickname_is_rejected() {
    let harness = TestHarness::new();
    let mut alice = harness.connect(1, "alice").await;

    alice.send(join_room(42, "  ")).await;
    assert_error_code(&alice.recv().await, "VALIDATION_ERROR");
    assert_eq!(
        harness.presence.occupancy(Snowflake::new(42)).await.unwrap(),
        0
    );
}
