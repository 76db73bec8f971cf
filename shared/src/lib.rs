//! Shared types for the food-ordering platform
//!
//! Common types used by the order server and its clients:
//! domain models, money arithmetic, the unified error system,
//! and real-time message payloads.

pub mod error;
pub mod message;
pub mod models;
pub mod money;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use money::Money;
