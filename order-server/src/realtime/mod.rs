//! Real-time notification layer
//!
//! Clients hold a single authenticated WebSocket. The registry tracks
//! who is reachable (users, restaurant rooms, admins, per-order rooms)
//! and the router fans committed order events out to them. Delivery is
//! best effort over bounded per-socket queues; a slow client drops
//! messages rather than stalling the server.

pub mod gateway;
mod registry;
mod router;

pub use registry::{BoundConnection, ConnectionRegistry, OnlineStats};
pub use router::NotificationRouter;
