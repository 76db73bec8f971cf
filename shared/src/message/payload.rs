//! Real-time event payloads
//!
//! Every outbound message is an envelope:
//!
//! ```json
//! {
//!   "event": "new-order",
//!   "data": {
//!     "type": "NEW_ORDER",
//!     "order": { ... },
//!     "sound": true,
//!     "timestamp": "2026-08-29T12:00:00Z"
//!   }
//! }
//! ```
//!
//! `sound` hints that the receiving client should play an audible alert.
//! Delivery is fire-and-forget; the order record remains the durable
//! source of truth a client can always re-fetch.

use crate::models::Order;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typed payload of an outbound real-time message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum RealtimePayload {
    #[serde(rename = "NEW_ORDER")]
    NewOrder { order: Box<Order> },
    #[serde(rename = "ORDER_UPDATE")]
    OrderUpdate { order: Box<Order> },
    #[serde(rename = "DELIVERY_UPDATE")]
    DeliveryUpdate { delivery: Value },
}

impl RealtimePayload {
    /// Outbound event name matched by clients
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::NewOrder { .. } => "new-order",
            Self::OrderUpdate { .. } => "order-update",
            Self::DeliveryUpdate { .. } => "delivery-update",
        }
    }
}

/// Message body: payload plus the alert hint and emission timestamp
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeData {
    #[serde(flatten)]
    pub payload: RealtimePayload,
    pub sound: bool,
    pub timestamp: DateTime<Utc>,
}

/// Outbound message envelope
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeMessage {
    pub event: &'static str,
    pub data: RealtimeData,
}

impl RealtimeMessage {
    pub fn new(payload: RealtimePayload) -> Self {
        Self {
            event: payload.event_name(),
            data: RealtimeData {
                payload,
                sound: true,
                timestamp: Utc::now(),
            },
        }
    }

    pub fn new_order(order: &Order) -> Self {
        Self::new(RealtimePayload::NewOrder {
            order: Box::new(order.clone()),
        })
    }

    pub fn order_update(order: &Order) -> Self {
        Self::new(RealtimePayload::OrderUpdate {
            order: Box::new(order.clone()),
        })
    }

    pub fn delivery_update(delivery: Value) -> Self {
        Self::new(RealtimePayload::DeliveryUpdate { delivery })
    }

    /// Serialize once for fan-out to many sockets
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Inbound events a connected client may send
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Restaurant staff device declares which restaurant it represents
    JoinRestaurant {
        #[serde(rename = "restaurantId")]
        restaurant_id: String,
    },
    /// Opt in to delivery updates for a single order
    JoinOrder {
        #[serde(rename = "orderId")]
        order_id: String,
    },
    /// Connection health probe, answered with `{"event": "pong"}`
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_event_parse() {
        let ev: ClientEvent =
            serde_json::from_str(r#"{"event":"join-restaurant","restaurantId":"rest-1"}"#)
                .unwrap();
        assert!(matches!(
            ev,
            ClientEvent::JoinRestaurant { restaurant_id } if restaurant_id == "rest-1"
        ));

        let ev: ClientEvent = serde_json::from_str(r#"{"event":"ping"}"#).unwrap();
        assert!(matches!(ev, ClientEvent::Ping));

        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"shout"}"#).is_err());
    }

    #[test]
    fn test_delivery_update_envelope() {
        let msg = RealtimeMessage::delivery_update(serde_json::json!({"eta": 12}));
        let json: Value = serde_json::from_str(&msg.to_text().unwrap()).unwrap();
        assert_eq!(json["event"], "delivery-update");
        assert_eq!(json["data"]["type"], "DELIVERY_UPDATE");
        assert_eq!(json["data"]["sound"], true);
        assert_eq!(json["data"]["delivery"]["eta"], 12);
    }
}
