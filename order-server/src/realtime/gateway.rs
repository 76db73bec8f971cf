//! WebSocket gateway
//!
//! One upgraded socket per client. The handshake authenticates with the
//! same JWTs as HTTP (query `?token=` for browser clients, bearer header
//! otherwise); an unauthenticated upgrade is rejected before the socket
//! opens. After upgrade the connection task owns the socket: outbound
//! messages arrive on the registry queue, inbound frames carry
//! [`ClientEvent`]s.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use http::HeaderMap;
use serde::Deserialize;
use shared::message::ClientEvent;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::realtime::BoundConnection;
use crate::store::RestaurantProvider;
use crate::utils::{AppError, AppResult};

/// Per-socket outbound queue depth; a client this far behind starts
/// losing messages
const OUTBOUND_QUEUE_SIZE: usize = 32;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// GET /ws upgrade handler
pub async fn handle_ws(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    State(state): State<ServerState>,
) -> AppResult<Response> {
    let header_token = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_from_header)
        .map(str::to_string);

    let token = query
        .token
        .or(header_token)
        .ok_or_else(AppError::unauthorized)?;

    let claims = state
        .get_jwt_service()
        .validate_token(&token)
        .map_err(|e| match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        })?;
    let user = CurrentUser::from(claims);

    Ok(ws.on_upgrade(move |socket| handle_connection(socket, state, user)))
}

async fn handle_connection(socket: WebSocket, state: ServerState, user: CurrentUser) {
    let socket_id = Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE_SIZE);

    let mut bound =
        BoundConnection::bind(state.registry.clone(), &user, socket_id.clone(), tx);

    tracing::info!(
        socket_id = %bound.socket_id(),
        user_id = %user.id,
        role = %user.role,
        "WebSocket connected"
    );

    let (mut ws_sink, mut ws_stream) = socket.split();

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                match outbound {
                    Some(text) => {
                        if ws_sink.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    // Registry shut down and dropped our queue
                    None => break,
                }
            }
            inbound = ws_stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(text.as_str()) {
                            Ok(ClientEvent::Ping) => {
                                if ws_sink
                                    .send(Message::Text(r#"{"event":"pong"}"#.into()))
                                    .await
                                    .is_err()
                                {
                                    break;
                                }
                            }
                            Ok(event) => handle_client_event(event, &state, &user, &mut bound).await,
                            Err(e) => {
                                tracing::debug!(
                                    socket_id = %bound.socket_id(),
                                    error = %e,
                                    "Ignoring unrecognized client event"
                                );
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if ws_sink.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(
                            socket_id = %bound.socket_id(),
                            error = %e,
                            "WebSocket read error"
                        );
                        break;
                    }
                }
            }
        }
    }

    tracing::info!(
        socket_id = %bound.socket_id(),
        user_id = %user.id,
        "WebSocket disconnected"
    );
    bound.unbind();
}

async fn handle_client_event(
    event: ClientEvent,
    state: &ServerState,
    user: &CurrentUser,
    bound: &mut BoundConnection,
) {
    match event {
        ClientEvent::JoinRestaurant { restaurant_id } => {
            if !user.is_restaurant_owner() {
                tracing::warn!(
                    user_id = %user.id,
                    restaurant_id,
                    "Non-restaurant client tried to join a restaurant room"
                );
                return;
            }
            match state.store.get_restaurant(&restaurant_id).await {
                Ok(Some(restaurant)) if restaurant.owner_id == user.id => {
                    bound.join_restaurant(&restaurant_id);
                    tracing::debug!(
                        socket_id = %bound.socket_id(),
                        restaurant_id,
                        "Joined restaurant room"
                    );
                }
                Ok(_) => {
                    tracing::warn!(
                        user_id = %user.id,
                        restaurant_id,
                        "Rejected join for restaurant the user does not own"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Restaurant lookup failed during room join");
                }
            }
        }
        ClientEvent::JoinOrder { order_id } => {
            // Same visibility rule as fetching the order over HTTP
            match state.orders.get_order(user, &order_id).await {
                Ok(_) => {
                    bound.join_order(&order_id);
                    tracing::debug!(
                        socket_id = %bound.socket_id(),
                        order_id,
                        "Joined order room"
                    );
                }
                Err(e) => {
                    tracing::debug!(
                        user_id = %user.id,
                        order_id,
                        error = %e,
                        "Rejected order room join"
                    );
                }
            }
        }
        // Answered inline by the connection loop
        ClientEvent::Ping => {}
    }
}
