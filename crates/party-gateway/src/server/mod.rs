//! Gateway server setup
//!
//! Provides the WebSocket server configuration, routes, and dependency
//! wiring.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use crate::broadcast::{Broadcaster, EventDispatcher, EventDispatcherConfig};
use crate::connection::ConnectionManager;
use crate::session::{MessageService, SessionHandler};
use axum::{routing::get, Router};
use party_cache::{Publisher, RedisPool, RedisPoolConfig, RedisPresenceStore};
use party_common::{AppConfig, AppError};
use party_core::SnowflakeGenerator;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies and create `GatewayState`
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    // Create database pool
    tracing::info!("Connecting to PostgreSQL...");
    let db_config = party_db::DatabaseConfig::from(&config.database);
    let pool = party_db::create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    // Create Redis pool
    tracing::info!("Connecting to Redis...");
    let redis_config = RedisPoolConfig::from(&config.redis);
    let redis_pool = RedisPool::new(redis_config).map_err(|e| AppError::Cache(e.to_string()))?;
    tracing::info!("Redis connection established");

    // Create Snowflake generator
    let id_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    // Create repositories and stores
    let message_repo = Arc::new(party_db::PgMessageRepository::new(pool.clone()));
    let conversation_repo = Arc::new(party_db::PgConversationRepository::new(
        pool.clone(),
        id_generator.clone(),
    ));
    let participants = Arc::new(party_db::PgParticipantDirectory::new(pool));
    let presence = Arc::new(RedisPresenceStore::new(redis_pool.clone()));

    // Create connection manager and fan-out
    let connection_manager = ConnectionManager::new_shared();

    let dispatcher_config = EventDispatcherConfig {
        redis_url: config.redis.url.clone(),
        ..Default::default()
    };
    let event_dispatcher = Arc::new(EventDispatcher::new(
        dispatcher_config,
        connection_manager.clone(),
    ));
    event_dispatcher.clone().start();

    let broadcaster = Arc::new(Broadcaster::with_redis(
        connection_manager.clone(),
        Publisher::new(redis_pool),
        event_dispatcher,
    ));

    // Create the session handler
    let messages = MessageService::new(message_repo, conversation_repo, id_generator);
    let session = Arc::new(SessionHandler::new(
        presence,
        participants,
        messages,
        broadcaster,
    ));

    Ok(GatewayState::new(session, connection_manager, config))
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting Gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/gateway", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.gateway.port));

    let state = create_gateway_state(config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
