use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gomoku_server::{
    config::ServerConfig,
    room::{repository::InMemoryRoomRepository, start_cleanup_task, RoomService},
    session::{
        create_session, repository::InMemorySessionRepository, PetNameUsernameGenerator,
        SessionService, TokenConfig,
    },
    shared::AppState,
    websockets::{websocket_handler, InMemoryConnectionManager},
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gomoku_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(bind_addr = %config.bind_addr, "Starting five-in-a-row game server");

    let session_service = Arc::new(SessionService::new(
        Arc::new(InMemorySessionRepository::new()),
        Arc::new(PetNameUsernameGenerator::new()),
        TokenConfig::new(config.jwt_secret.clone(), config.session_expiration_days),
    ));
    let room_service = Arc::new(RoomService::new(
        Arc::new(InMemoryRoomRepository::new()),
        config.chat_history_limit,
    ));
    let connection_manager = Arc::new(InMemoryConnectionManager::new());

    tokio::spawn(start_cleanup_task(
        room_service.clone(),
        config.cleanup.clone(),
    ));

    let app_state = AppState::new(session_service, room_service, connection_manager);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/session", post(create_session))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(bind_addr = %config.bind_addr, error = %e, "Failed to bind listener");
            std::process::exit(1);
        }
    };
    info!("Server running on http://{}", config.bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server terminated");
    }
}
