//! Order endpoint handlers
//!
//! Handlers stay thin: decode the request, call the manager, wrap the
//! result in the response envelope. All authorization lives in the
//! manager so the rules hold for WebSocket callers too.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::NaiveDate;
use http::StatusCode;
use serde::Deserialize;
use shared::models::{Order, OrderStatus};
use shared::{ApiResponse, AppError, AppResult};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::orders::{CreateOrderInput, OrderPage};
use crate::store::OrderFilter;

fn parse_status(s: &str) -> AppResult<OrderStatus> {
    s.parse()
        .map_err(|()| AppError::invalid(format!("Unknown order status: {}", s)))
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<impl IntoResponse> {
    let order = state.orders.create_order(&user, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

#[derive(Debug, Deserialize)]
pub struct MyOrdersQuery {
    status: Option<String>,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// GET /api/orders/my-orders
pub async fn my_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<MyOrdersQuery>,
) -> AppResult<Json<ApiResponse<OrderPage>>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let page = state
        .orders
        .list_user_orders(&user, status, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.get_order(&user, &id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status, validated against the state machine
    status: String,
    /// Optional reason, recorded for cancellations
    reason: Option<String>,
}

/// PATCH /api/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let status = parse_status(&body.status)?;
    let order = state
        .orders
        .update_status(&user, &id, status, body.reason)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    reason: Option<String>,
}

/// PATCH /api/orders/{id}/cancel
pub async fn cancel_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Option<Json<CancelRequest>>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let reason = body.and_then(|Json(b)| b.reason);
    let order = state.orders.cancel_order(&user, &id, reason).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[derive(Debug, Deserialize)]
pub struct RestaurantOrdersQuery {
    status: Option<String>,
    /// Calendar day filter, `YYYY-MM-DD`
    date: Option<NaiveDate>,
}

#[derive(Debug, serde::Serialize)]
pub struct RestaurantOrders {
    pub count: usize,
    pub orders: Vec<Order>,
}

/// GET /api/orders/restaurant/{restaurant_id}
pub async fn restaurant_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(restaurant_id): Path<String>,
    Query(query): Query<RestaurantOrdersQuery>,
) -> AppResult<Json<ApiResponse<RestaurantOrders>>> {
    let filter = OrderFilter {
        status: query.status.as_deref().map(parse_status).transpose()?,
        date: query.date,
    };
    let orders = state
        .orders
        .list_restaurant_orders(&user, &restaurant_id, &filter)
        .await?;
    Ok(Json(ApiResponse::success(RestaurantOrders {
        count: orders.len(),
        orders,
    })))
}

/// POST /api/orders/{id}/confirm-payment
pub async fn confirm_payment(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = state.orders.confirm_payment(&user, &id).await?;
    Ok(Json(ApiResponse::success(order)))
}
