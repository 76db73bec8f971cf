//! Persistence interfaces
//!
//! The order core talks to a transactional document store and to its
//! external collaborators (catalog, restaurant profiles, coupons) only
//! through these traits. [`MemoryStore`] implements all of them for the
//! single-process deployment and for tests; a persistent store can be
//! slotted in behind the same interfaces.
//!
//! The two counters mutated by concurrent orders - the restaurant
//! earnings ledger and the coupon usage count - are updated through
//! dedicated atomic operations ([`RestaurantProvider::add_earnings`],
//! [`CouponStore::try_redeem`]) rather than application-level
//! read-modify-write, so concurrent orders cannot lose updates.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::models::{Coupon, MenuItem, Order, OrderStatus, Restaurant};
use shared::{AppResult, Money};

/// Filter for restaurant-side order listings
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Calendar day (UTC) the order was created on
    pub date: Option<NaiveDate>,
}

/// One page of a user's order history
#[derive(Debug, Clone)]
pub struct OrderListPage {
    pub orders: Vec<Order>,
    pub total: u64,
}

/// Transactional order persistence
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: Order) -> AppResult<Order>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Order>>;

    /// Replace the stored document (per-document atomicity assumed)
    async fn update(&self, order: Order) -> AppResult<Order>;

    /// Lookup backing the duplicate-submit guard: most recent order from
    /// the same user to the same restaurant with the same total, created
    /// at or after `since`.
    async fn find_recent_duplicate(
        &self,
        user_id: &str,
        restaurant_id: &str,
        total: Money,
        since: DateTime<Utc>,
    ) -> AppResult<Option<Order>>;

    /// Newest-first page of a user's orders, optionally filtered by status.
    /// `page` is 1-based.
    async fn list_for_user(
        &self,
        user_id: &str,
        status: Option<OrderStatus>,
        page: u32,
        limit: u32,
    ) -> AppResult<OrderListPage>;

    /// Newest-first orders for a restaurant, filtered by status/date
    async fn list_for_restaurant(
        &self,
        restaurant_id: &str,
        filter: &OrderFilter,
    ) -> AppResult<Vec<Order>>;
}

/// Restaurant profile lookup and earnings settlement
#[async_trait]
pub trait RestaurantProvider: Send + Sync {
    async fn get_restaurant(&self, id: &str) -> AppResult<Option<Restaurant>>;

    /// Atomically add `delta` (minor units) to the earnings ledger
    async fn add_earnings(&self, id: &str, delta: Money) -> AppResult<()>;
}

/// Catalog lookup
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn get_menu_item(&self, id: &str) -> AppResult<Option<MenuItem>>;
}

/// Coupon lookup and usage accounting
#[async_trait]
pub trait CouponStore: Send + Sync {
    /// `code` is expected in canonical (upper-case) form
    async fn get_coupon(&self, code: &str) -> AppResult<Option<Coupon>>;

    /// Atomically increment the usage counter. Returns `false` without
    /// incrementing when the coupon is missing or its usage limit is
    /// already reached.
    async fn try_redeem(&self, code: &str) -> AppResult<bool>;
}
