//! Order server - food-ordering order core
//!
//! # Architecture
//!
//! The server owns the order lifecycle and the real-time notification
//! layer. Catalog, restaurant profiles, coupons, and auth issuance are
//! external collaborators reached through the `store` interfaces.
//!
//! ```text
//! order-server/src/
//! ├── core/          # Config, ServerState, run loop
//! ├── auth/          # JWT validation, CurrentUser extractor
//! ├── store/         # Repository/provider traits + in-memory store
//! ├── orders/        # Order lifecycle, pricing, coupon evaluation
//! ├── realtime/      # Connection registry, router, WebSocket gateway
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # Logger, result alias
//! ```
//!
//! # Control flow
//!
//! ```text
//! HTTP request → OrderManager → {pricing, coupon, OrderRepository}
//!                    │ (after commit, fire-and-forget)
//!                    ▼
//!           NotificationRouter → ConnectionRegistry → WebSocket clients
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod orders;
pub mod realtime;
pub mod store;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use crate::core::{Config, Server, ServerState};
pub use orders::OrderManager;
pub use realtime::{ConnectionRegistry, NotificationRouter};
pub use utils::{AppError, AppResult};
