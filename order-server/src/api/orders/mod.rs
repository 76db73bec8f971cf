//! Order routes

mod handler;

use axum::Router;
use axum::routing::{get, patch, post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/orders",
        Router::new()
            .route("/", post(handler::create_order))
            .route("/my-orders", get(handler::my_orders))
            .route("/restaurant/{restaurant_id}", get(handler::restaurant_orders))
            .route("/{id}", get(handler::get_order))
            .route("/{id}/status", patch(handler::update_status))
            .route("/{id}/cancel", patch(handler::cancel_order))
            .route("/{id}/confirm-payment", post(handler::confirm_payment)),
    )
}
