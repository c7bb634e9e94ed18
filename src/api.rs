//! HTTP endpoints and router assembly.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::state::AppState;
use crate::types::RoomCode;
use crate::ws;

#[derive(Debug, Clone, Serialize)]
pub struct CreateRoomResponse {
    pub room_code: RoomCode,
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// GET /api
pub async fn api_root() -> Json<Value> {
    Json(json!({ "message": "Word Basket API is running" }))
}

/// POST /api/rooms
///
/// Opens a new waiting room. The creator becomes host by being the first to
/// connect to it.
pub async fn create_room(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<CreateRoomResponse>) {
    let room = state.rooms.create_room().await;
    (
        StatusCode::CREATED,
        Json(CreateRoomResponse {
            room_code: room.code.clone(),
        }),
    )
}

/// Build the application router with static file fallback
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/health", get(health))
        .route("/api", get(api_root))
        .route("/api/rooms", post(create_room))
        .route("/ws/{room_code}/{player_name}", get(ws::ws_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
