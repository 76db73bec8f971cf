//! HTTP surface
//!
//! Route tables live next to their handlers; this module only merges
//! them and applies the cross-cutting layers.

pub mod health;
pub mod orders;
pub mod realtime;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(realtime::router())
}

/// Full application with middleware, ready to serve
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
