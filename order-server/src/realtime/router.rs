//! Notification router
//!
//! Translates committed order events into wire messages and fans them
//! out through the registry. Every method is infallible by contract:
//! the order write has already committed, so delivery problems are
//! logged and swallowed.

use std::sync::Arc;

use serde_json::Value;
use shared::message::RealtimeMessage;
use shared::models::Order;

use super::ConnectionRegistry;

#[derive(Clone)]
pub struct NotificationRouter {
    registry: Arc<ConnectionRegistry>,
}

impl NotificationRouter {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn notify_restaurant_new_order(&self, restaurant_id: &str, order: &Order) {
        if let Some(text) = self.render(RealtimeMessage::new_order(order)) {
            let delivered = self.registry.emit_to_restaurant(restaurant_id, &text);
            tracing::debug!(
                order_id = %order.id,
                restaurant_id,
                delivered,
                "New-order notification to restaurant"
            );
        }
    }

    pub fn notify_admins_new_order(&self, order: &Order) {
        if let Some(text) = self.render(RealtimeMessage::new_order(order)) {
            let delivered = self.registry.emit_to_admins(&text);
            tracing::debug!(
                order_id = %order.id,
                delivered,
                "New-order notification to admins"
            );
        }
    }

    pub fn notify_user_order_update(&self, user_id: &str, order: &Order) {
        if let Some(text) = self.render(RealtimeMessage::order_update(order)) {
            let delivered = self.registry.emit_to_user(user_id, &text);
            tracing::debug!(
                order_id = %order.id,
                user_id,
                status = %order.status,
                delivered,
                "Order-update notification to user"
            );
        }
    }

    pub fn notify_delivery_update(&self, order_id: &str, delivery: Value) {
        if let Some(text) = self.render(RealtimeMessage::delivery_update(delivery)) {
            let delivered = self.registry.emit_to_order_room(order_id, &text);
            tracing::debug!(order_id, delivered, "Delivery update to order room");
        }
    }

    fn render(&self, message: RealtimeMessage) -> Option<String> {
        match message.to_text() {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize realtime message");
                None
            }
        }
    }
}
