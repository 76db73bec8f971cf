//! Order lifecycle core
//!
//! [`OrderManager`] owns order creation, status transitions, and the
//! money math behind them. Pricing and coupon evaluation are pure
//! functions so they can be tested without a store.

mod coupon;
mod manager;
mod pricing;

pub use coupon::evaluate_coupon;
pub use manager::{CreateOrderInput, OrderItemInput, OrderManager, OrderPage};
pub use pricing::{TAX_RATE_PERCENT, Totals, compute_totals, price_line};
