use crate::config::ServerConfig;
use crate::room::RoomManager;
use crate::signaling::{SignalingService, ws_handler};
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub signaling: SignalingService,
    pub rooms: RoomManager,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let signaling = SignalingService::new();
        let rooms = RoomManager::new(Arc::new(signaling.clone()), config.history_limit);
        Self { signaling, rooms }
    }
}

pub fn router(state: AppState) -> Router {
    // Browser clients are served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    serve_on(listener, config).await
}

/// Serve on an already bound listener.
pub async fn serve_on(listener: TcpListener, config: ServerConfig) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("Signaling server listening on ws://{}/ws", addr);

    let app = router(AppState::new(&config));
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
