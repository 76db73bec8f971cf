//! In-memory document store
//!
//! Backs the repository/provider traits with `DashMap`s. Entry-level
//! exclusive access gives the per-document atomicity the order core
//! assumes from its store; `try_redeem` and `add_earnings` mutate under
//! the entry lock, so concurrent orders cannot lose counter updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use shared::models::{Coupon, MenuItem, Order, Restaurant};
use shared::{AppError, AppResult, Money};

use super::{CatalogProvider, CouponStore, OrderFilter, OrderListPage, OrderRepository, RestaurantProvider};

#[derive(Debug, Default)]
pub struct MemoryStore {
    orders: DashMap<String, Order>,
    restaurants: DashMap<String, Restaurant>,
    menu_items: DashMap<String, MenuItem>,
    coupons: DashMap<String, Coupon>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seed/bootstrap helpers: catalog, restaurants, and coupons are
    // managed elsewhere; these let an operator or a test load them.

    pub fn upsert_restaurant(&self, restaurant: Restaurant) {
        self.restaurants.insert(restaurant.id.clone(), restaurant);
    }

    pub fn upsert_menu_item(&self, item: MenuItem) {
        self.menu_items.insert(item.id.clone(), item);
    }

    pub fn upsert_coupon(&self, coupon: Coupon) {
        let code = Coupon::normalize_code(&coupon.code);
        self.coupons.insert(
            code.clone(),
            Coupon {
                code,
                ..coupon
            },
        );
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert(&self, order: Order) -> AppResult<Order> {
        self.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Order>> {
        Ok(self.orders.get(id).map(|o| o.clone()))
    }

    async fn update(&self, order: Order) -> AppResult<Order> {
        if !self.orders.contains_key(&order.id) {
            return Err(AppError::database(format!(
                "Order {} vanished during update",
                order.id
            )));
        }
        self.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn find_recent_duplicate(
        &self,
        user_id: &str,
        restaurant_id: &str,
        total: Money,
        since: DateTime<Utc>,
    ) -> AppResult<Option<Order>> {
        let found = self
            .orders
            .iter()
            .filter(|entry| {
                let o = entry.value();
                o.user_id == user_id
                    && o.restaurant_id == restaurant_id
                    && o.total == total
                    && o.created_at >= since
            })
            .map(|entry| entry.value().clone())
            .max_by_key(|o| o.created_at);
        Ok(found)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        status: Option<shared::models::OrderStatus>,
        page: u32,
        limit: u32,
    ) -> AppResult<OrderListPage> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| {
                let o = entry.value();
                o.user_id == user_id && status.is_none_or(|s| o.status == s)
            })
            .map(|entry| entry.value().clone())
            .collect();

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = orders.len() as u64;
        let page = page.max(1);
        // Widened before multiplying; page comes straight off the query
        // string and u32 math overflows at page 42_949_673 * limit 100
        let offset = (page as u64 - 1) * limit as u64;
        let orders = orders
            .into_iter()
            .skip(offset.min(total) as usize)
            .take(limit as usize)
            .collect();

        Ok(OrderListPage { orders, total })
    }

    async fn list_for_restaurant(
        &self,
        restaurant_id: &str,
        filter: &OrderFilter,
    ) -> AppResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| {
                let o = entry.value();
                o.restaurant_id == restaurant_id
                    && filter.status.is_none_or(|s| o.status == s)
                    && filter.date.is_none_or(|d| o.created_at.date_naive() == d)
            })
            .map(|entry| entry.value().clone())
            .collect();

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

#[async_trait]
impl RestaurantProvider for MemoryStore {
    async fn get_restaurant(&self, id: &str) -> AppResult<Option<Restaurant>> {
        Ok(self.restaurants.get(id).map(|r| r.clone()))
    }

    async fn add_earnings(&self, id: &str, delta: Money) -> AppResult<()> {
        match self.restaurants.get_mut(id) {
            Some(mut restaurant) => {
                restaurant.total_earnings += delta;
                Ok(())
            }
            None => Err(AppError::with_message(
                shared::ErrorCode::RestaurantNotFound,
                format!("Restaurant {} not found for settlement", id),
            )),
        }
    }
}

#[async_trait]
impl CatalogProvider for MemoryStore {
    async fn get_menu_item(&self, id: &str) -> AppResult<Option<MenuItem>> {
        Ok(self.menu_items.get(id).map(|m| m.clone()))
    }
}

#[async_trait]
impl CouponStore for MemoryStore {
    async fn get_coupon(&self, code: &str) -> AppResult<Option<Coupon>> {
        Ok(self.coupons.get(code).map(|c| c.clone()))
    }

    async fn try_redeem(&self, code: &str) -> AppResult<bool> {
        match self.coupons.get_mut(code) {
            Some(mut coupon) => {
                if coupon
                    .usage_limit
                    .is_some_and(|limit| coupon.used_count >= limit)
                {
                    return Ok(false);
                }
                coupon.used_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
