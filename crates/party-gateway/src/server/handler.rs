//! WebSocket handler
//!
//! Accepts upgrades, pumps frames in and out, and hands parsed events to
//! the session layer. Identity arrives pre-authenticated as query
//! parameters on the upgrade request.

use crate::connection::Connection;
use crate::events::{ClientEvent, ServerEvent};
use crate::server::GatewayState;
use axum::{
    extract::{ws::Message, Query, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use party_core::Snowflake;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Channel buffer size for outgoing events
const EVENT_BUFFER_SIZE: usize = 100;

/// Identity supplied by the upstream auth layer on the upgrade request
#[derive(Debug, Deserialize)]
pub struct IdentityParams {
    /// Authenticated user id
    #[serde(rename = "userId")]
    pub user_id: Snowflake,
    /// Display name
    pub nickname: String,
}

/// WebSocket gateway handler
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(identity): Query<IdentityParams>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, identity, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(
    state: GatewayState,
    identity: IdentityParams,
    socket: axum::extract::ws::WebSocket,
) {
    let connection_id = Uuid::new_v4().to_string();

    // Create event channel for outgoing events
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(EVENT_BUFFER_SIZE);

    // Register connection
    let connection = state.connection_manager().add_connection(
        connection_id.clone(),
        identity.user_id,
        identity.nickname,
        tx,
    );

    tracing::info!(
        connection_id = %connection_id,
        user_id = %connection.user_id(),
        "WebSocket connection established"
    );

    state.session().handle_connect(&connection).await;

    // Split the WebSocket
    let (mut ws_sink, mut ws_stream) = socket.split();

    // Clone for receive task
    let state_recv = state.clone();
    let connection_recv = connection.clone();

    // Spawn task to receive events from the WebSocket
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    handle_text_frame(&state_recv, &connection_recv, &text).await;
                }
                Ok(Message::Binary(_)) => {
                    state_recv
                        .session()
                        .handle_invalid_frame(&connection_recv, "binary frames not supported")
                        .await;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Control frames handled by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(
                        connection_id = %connection_recv.id(),
                        "Client closed connection"
                    );
                    return;
                }
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_recv.id(),
                        error = %e,
                        "WebSocket error"
                    );
                    return;
                }
            }
        }
    });

    // Clone for send task
    let connection_id_send = connection_id.clone();

    // Spawn task to send events to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event.to_json() {
                Ok(json) => {
                    if ws_sink.send(Message::Text(json.into())).await.is_err() {
                        tracing::warn!(
                            connection_id = %connection_id_send,
                            "Failed to send event to WebSocket"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        connection_id = %connection_id_send,
                        error = %e,
                        "Failed to serialize outbound event"
                    );
                }
            }
        }

        // Close the WebSocket when the channel is closed
        let _ = ws_sink.close().await;
    });

    // Wait for either pump to finish; a dead socket ends both
    tokio::select! {
        _ = recv_task => {
            tracing::debug!(connection_id = %connection_id, "Receive task ended");
        }
        _ = send_task => {
            tracing::debug!(connection_id = %connection_id, "Send task ended");
        }
    }

    // Clean or unclean, disconnect is the cleanup trigger
    state.session().handle_disconnect(&connection).await;
    state.connection_manager().remove_connection(&connection_id);
}

/// Parse a text frame and dispatch it to the session layer
async fn handle_text_frame(state: &GatewayState, connection: &Arc<Connection>, text: &str) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => {
            state.session().handle_event(connection, event).await;
        }
        Err(e) => {
            state
                .session()
                .handle_invalid_frame(connection, &e.to_string())
                .await;
        }
    }
}
