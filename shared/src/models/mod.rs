//! Data models
//!
//! Shared between the order server and its clients (via API).
//! All monetary fields are integer minor units ([`crate::Money`]);
//! all IDs are `String` (UUID v4).

pub mod address;
pub mod coupon;
pub mod menu_item;
pub mod order;
pub mod restaurant;
pub mod role;

// Re-exports
pub use address::*;
pub use coupon::*;
pub use menu_item::*;
pub use order::*;
pub use restaurant::*;
pub use role::*;
