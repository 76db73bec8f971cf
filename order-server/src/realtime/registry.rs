//! Connection registry
//!
//! Maps identities to live socket senders. Four partitions:
//!
//! - `users`: one socket per user id; a reconnect supersedes the old
//!   socket, the superseded sender is dropped and its connection closes.
//! - `restaurants`: room per restaurant id, any number of staff devices.
//! - `admins`: flat set keyed by socket id.
//! - `order_rooms`: opt-in room per order id for delivery updates.
//!
//! Senders are bounded mpsc queues into each socket's writer task.
//! Emits use `try_send`: a full queue means that client loses the
//! message, which is fine because the order record stays fetchable.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use shared::models::Role;
use tokio::sync::mpsc;

use crate::auth::CurrentUser;

pub type ClientSender = mpsc::Sender<String>;

#[derive(Debug)]
struct UserEntry {
    socket_id: String,
    tx: ClientSender,
}

/// Gauges exposed on the stats endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineStats {
    pub online_users: usize,
    pub restaurant_rooms: usize,
    pub restaurant_sockets: usize,
    pub online_admins: usize,
    pub order_rooms: usize,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    users: DashMap<String, UserEntry>,
    restaurants: DashMap<String, HashMap<String, ClientSender>>,
    admins: DashMap<String, ClientSender>,
    order_rooms: DashMap<String, HashMap<String, ClientSender>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== binding ====================

    fn bind_user(&self, user_id: &str, socket_id: &str, tx: ClientSender) {
        let previous = self.users.insert(
            user_id.to_string(),
            UserEntry {
                socket_id: socket_id.to_string(),
                tx,
            },
        );
        if previous.is_some() {
            tracing::debug!(user_id, "Superseding previous socket for user");
        }
    }

    /// Remove the user binding only if this socket still owns it. A
    /// newer connection may have superseded us while we were closing.
    fn unbind_user(&self, user_id: &str, socket_id: &str) {
        self.users
            .remove_if(user_id, |_, entry| entry.socket_id == socket_id);
    }

    fn bind_admin(&self, socket_id: &str, tx: ClientSender) {
        self.admins.insert(socket_id.to_string(), tx);
    }

    fn unbind_admin(&self, socket_id: &str) {
        self.admins.remove(socket_id);
    }

    fn join_restaurant(&self, restaurant_id: &str, socket_id: &str, tx: ClientSender) {
        self.restaurants
            .entry(restaurant_id.to_string())
            .or_default()
            .insert(socket_id.to_string(), tx);
    }

    fn leave_restaurant(&self, restaurant_id: &str, socket_id: &str) {
        if let Some(mut room) = self.restaurants.get_mut(restaurant_id) {
            room.remove(socket_id);
        }
        // Entry guard must be dropped before removal
        self.restaurants
            .remove_if(restaurant_id, |_, room| room.is_empty());
    }

    fn join_order(&self, order_id: &str, socket_id: &str, tx: ClientSender) {
        self.order_rooms
            .entry(order_id.to_string())
            .or_default()
            .insert(socket_id.to_string(), tx);
    }

    fn leave_order(&self, order_id: &str, socket_id: &str) {
        if let Some(mut room) = self.order_rooms.get_mut(order_id) {
            room.remove(socket_id);
        }
        self.order_rooms
            .remove_if(order_id, |_, room| room.is_empty());
    }

    // ==================== emits ====================

    /// Returns the number of sockets that accepted the message
    pub fn emit_to_user(&self, user_id: &str, text: &str) -> usize {
        match self.users.get(user_id) {
            Some(entry) if entry.tx.try_send(text.to_string()).is_ok() => 1,
            _ => 0,
        }
    }

    pub fn emit_to_restaurant(&self, restaurant_id: &str, text: &str) -> usize {
        match self.restaurants.get(restaurant_id) {
            Some(room) => room
                .values()
                .filter(|tx| tx.try_send(text.to_string()).is_ok())
                .count(),
            None => 0,
        }
    }

    pub fn emit_to_admins(&self, text: &str) -> usize {
        self.admins
            .iter()
            .filter(|entry| entry.value().try_send(text.to_string()).is_ok())
            .count()
    }

    pub fn emit_to_order_room(&self, order_id: &str, text: &str) -> usize {
        match self.order_rooms.get(order_id) {
            Some(room) => room
                .values()
                .filter(|tx| tx.try_send(text.to_string()).is_ok())
                .count(),
            None => 0,
        }
    }

    pub fn stats(&self) -> OnlineStats {
        OnlineStats {
            online_users: self.users.len(),
            restaurant_rooms: self.restaurants.len(),
            restaurant_sockets: self
                .restaurants
                .iter()
                .map(|room| room.value().len())
                .sum(),
            online_admins: self.admins.len(),
            order_rooms: self.order_rooms.len(),
        }
    }

    /// Drop every sender, closing all client queues. Called once on
    /// graceful shutdown.
    pub fn shutdown(&self) {
        self.users.clear();
        self.restaurants.clear();
        self.admins.clear();
        self.order_rooms.clear();
    }
}

#[derive(Debug)]
enum BindingKind {
    Admin,
    Restaurant { rooms: Vec<String> },
    User { user_id: String },
}

/// A socket's registrations, created at handshake and released when the
/// connection closes. Owns the cleanup so the gateway loop cannot leak
/// registry entries on any exit path.
#[derive(Debug)]
pub struct BoundConnection {
    registry: Arc<ConnectionRegistry>,
    socket_id: String,
    tx: ClientSender,
    kind: BindingKind,
    order_rooms: Vec<String>,
}

impl BoundConnection {
    pub fn bind(
        registry: Arc<ConnectionRegistry>,
        user: &CurrentUser,
        socket_id: String,
        tx: ClientSender,
    ) -> Self {
        let kind = match user.role {
            Role::Admin => {
                registry.bind_admin(&socket_id, tx.clone());
                BindingKind::Admin
            }
            Role::RestaurantOwner => {
                // Staff devices declare their restaurant with a
                // join-restaurant event after connecting
                BindingKind::Restaurant { rooms: Vec::new() }
            }
            Role::User => {
                registry.bind_user(&user.id, &socket_id, tx.clone());
                BindingKind::User {
                    user_id: user.id.clone(),
                }
            }
        };

        Self {
            registry,
            socket_id,
            tx,
            kind,
            order_rooms: Vec::new(),
        }
    }

    pub fn socket_id(&self) -> &str {
        &self.socket_id
    }

    pub fn join_restaurant(&mut self, restaurant_id: &str) {
        if let BindingKind::Restaurant { rooms } = &mut self.kind {
            if !rooms.iter().any(|r| r == restaurant_id) {
                self.registry
                    .join_restaurant(restaurant_id, &self.socket_id, self.tx.clone());
                rooms.push(restaurant_id.to_string());
            }
        }
    }

    pub fn join_order(&mut self, order_id: &str) {
        if !self.order_rooms.iter().any(|r| r == order_id) {
            self.registry
                .join_order(order_id, &self.socket_id, self.tx.clone());
            self.order_rooms.push(order_id.to_string());
        }
    }

    pub fn unbind(self) {
        match &self.kind {
            BindingKind::Admin => self.registry.unbind_admin(&self.socket_id),
            BindingKind::Restaurant { rooms } => {
                for restaurant_id in rooms {
                    self.registry.leave_restaurant(restaurant_id, &self.socket_id);
                }
            }
            BindingKind::User { user_id } => {
                self.registry.unbind_user(user_id, &self.socket_id);
            }
        }
        for order_id in &self.order_rooms {
            self.registry.leave_order(order_id, &self.socket_id);
        }
    }
}
