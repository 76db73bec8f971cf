//! Realtime routes: the WebSocket upgrade and the stats gauge

use axum::routing::{any, get};
use axum::{Json, Router};
use axum::extract::State;
use shared::{ApiResponse, AppError, AppResult};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::realtime::{OnlineStats, gateway};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/ws", any(gateway::handle_ws))
        .route("/api/realtime/stats", get(stats))
}

/// GET /api/realtime/stats
async fn stats(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<OnlineStats>>> {
    if !user.is_admin() {
        return Err(AppError::forbidden("Admin access required"));
    }
    Ok(Json(ApiResponse::success(state.registry.stats())))
}
