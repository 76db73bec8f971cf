//! Order manager
//!
//! Single entry point for every order operation. Each method performs
//! the authorization and business-rule checks itself, persists through
//! the store traits, and only then hands the committed order to the
//! notification router. Notifications are fire-and-forget: a failure to
//! deliver never fails the operation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::models::{
    AddressSnapshot, Coupon, DeliveryAddress, Order, OrderItem, OrderStatus, PaymentMethod,
    PaymentStatus, Restaurant,
};
use shared::money::percentage;
use shared::{AppError, AppResult, ErrorCode, Money};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::orders::{compute_totals, evaluate_coupon, price_line};
use crate::realtime::NotificationRouter;
use crate::store::{
    CatalogProvider, CouponStore, OrderFilter, OrderRepository, RestaurantProvider,
};

#[cfg(test)]
mod tests;

/// Window for the duplicate-submit guard. A create request matching an
/// existing order (same user, restaurant, and total) inside this window
/// returns the existing order instead of inserting a second one.
const DUPLICATE_WINDOW_SECS: i64 = 5;

/// Fallback preparation estimate when the restaurant profile has none
const DEFAULT_DELIVERY_MINUTES: u32 = 30;

/// One requested line of a new order
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub menu_item_id: String,
    pub quantity: u32,
}

/// Checkout request body. Client-supplied amounts are never accepted;
/// every price on the resulting order is recomputed from the catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    pub restaurant_id: String,
    #[serde(default)]
    pub address_id: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<AddressSnapshot>,
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub delivery_instructions: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// One page of a user's order history
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total_orders: u64,
}

pub struct OrderManager {
    orders: Arc<dyn OrderRepository>,
    restaurants: Arc<dyn RestaurantProvider>,
    catalog: Arc<dyn CatalogProvider>,
    coupons: Arc<dyn CouponStore>,
    notifier: NotificationRouter,
}

impl OrderManager {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        restaurants: Arc<dyn RestaurantProvider>,
        catalog: Arc<dyn CatalogProvider>,
        coupons: Arc<dyn CouponStore>,
        notifier: NotificationRouter,
    ) -> Self {
        Self {
            orders,
            restaurants,
            catalog,
            coupons,
            notifier,
        }
    }

    /// Create an order for the authenticated user.
    pub async fn create_order(
        &self,
        user: &CurrentUser,
        input: CreateOrderInput,
    ) -> AppResult<Order> {
        if input.items.is_empty() {
            return Err(AppError::validation("Order must contain at least one item"));
        }

        let delivery_address =
            DeliveryAddress::from_parts(input.address_id.clone(), input.delivery_address.clone())?;

        let restaurant = self.load_orderable_restaurant(&input.restaurant_id).await?;

        let mut items: Vec<OrderItem> = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let menu_item = self
                .catalog
                .get_menu_item(&line.menu_item_id)
                .await?
                .filter(|m| m.restaurant_id == input.restaurant_id)
                .ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::MenuItemNotFound,
                        format!("Menu item {} not found", line.menu_item_id),
                    )
                })?;
            items.push(price_line(&menu_item, line.quantity)?);
        }

        let subtotal: Money = items.iter().map(OrderItem::line_total).sum();

        // Evaluate the coupon but hold the redemption until after the
        // duplicate guard, so a retried submit cannot burn the usage
        // counter for an order that is never inserted.
        let resolved = match &input.coupon_code {
            Some(code) => {
                self.resolve_coupon(code, subtotal, &input.restaurant_id, &user.id)
                    .await?
            }
            None => None,
        };
        let tentative_discount = resolved.as_ref().map_or(0, |(_, amount)| *amount);

        let mut totals = compute_totals(subtotal, restaurant.delivery_fee, tentative_discount);
        let now = Utc::now();

        // Duplicate-submit guard: an identical order from the same user
        // inside the window is assumed to be a double click or retry.
        let since = now - Duration::seconds(DUPLICATE_WINDOW_SECS);
        if let Some(existing) = self
            .orders
            .find_recent_duplicate(&user.id, &input.restaurant_id, totals.total, since)
            .await?
        {
            tracing::warn!(
                order_id = %existing.id,
                user_id = %user.id,
                "Duplicate order submission, returning existing order"
            );
            return Ok(existing);
        }

        let (discount, applied_code) = match resolved {
            Some((canonical, amount)) => {
                if self.coupons.try_redeem(&canonical).await? {
                    tracing::debug!(code = %canonical, amount, "Coupon applied");
                    (amount, Some(canonical))
                } else {
                    // Lost the race on the usage limit: order proceeds
                    // at full price
                    tracing::debug!(
                        code = %canonical,
                        "Coupon usage limit reached, skipping discount"
                    );
                    totals = compute_totals(subtotal, restaurant.delivery_fee, 0);
                    (0, None)
                }
            }
            None => (0, None),
        };

        let eta_minutes = restaurant
            .delivery_time_minutes
            .unwrap_or(DEFAULT_DELIVERY_MINUTES);

        let order = Order {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            restaurant_id: input.restaurant_id.clone(),
            delivery_address,
            items,
            subtotal,
            delivery_fee: restaurant.delivery_fee,
            tax: totals.tax,
            discount,
            coupon_code: applied_code,
            total: totals.total,
            payment_method: input.payment_method,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Pending,
            delivery_instructions: input.delivery_instructions.clone(),
            created_at: now,
            estimated_delivery: now + Duration::minutes(eta_minutes as i64),
            delivered_at: None,
            cancelled_at: None,
            cancellation_reason: None,
        };

        let order = self.orders.insert(order).await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %user.id,
            restaurant_id = %order.restaurant_id,
            total = order.total,
            "Order created"
        );

        self.notifier
            .notify_restaurant_new_order(&order.restaurant_id, &order);
        self.notifier.notify_admins_new_order(&order);

        Ok(order)
    }

    /// Fetch one order, visible to its owner, an admin, or the owner of
    /// the restaurant it was placed at.
    pub async fn get_order(&self, user: &CurrentUser, order_id: &str) -> AppResult<Order> {
        let order = self.load_order(order_id).await?;
        self.authorize_view(user, &order).await?;
        Ok(order)
    }

    /// Newest-first page of the authenticated user's own orders
    pub async fn list_user_orders(
        &self,
        user: &CurrentUser,
        status: Option<OrderStatus>,
        page: u32,
        limit: u32,
    ) -> AppResult<OrderPage> {
        let limit = limit.clamp(1, 100);
        let page = page.max(1);
        let listing = self.orders.list_for_user(&user.id, status, page, limit).await?;

        Ok(OrderPage {
            total_pages: listing.total.div_ceil(limit as u64),
            current_page: page,
            total_orders: listing.total,
            orders: listing.orders,
        })
    }

    /// Restaurant-side listing, for the owning restaurant or an admin
    pub async fn list_restaurant_orders(
        &self,
        user: &CurrentUser,
        restaurant_id: &str,
        filter: &OrderFilter,
    ) -> AppResult<Vec<Order>> {
        let restaurant = self.load_restaurant(restaurant_id).await?;
        if !user.is_admin() && restaurant.owner_id != user.id {
            return Err(AppError::forbidden(
                "You do not manage this restaurant",
            ));
        }
        self.orders.list_for_restaurant(restaurant_id, filter).await
    }

    /// Advance an order along the status state machine. Restaurant staff
    /// drive this; admins may step in for any restaurant.
    ///
    /// The transition check is read-then-update: like the rest of the
    /// lifecycle it relies on one writer per order (the staff device
    /// driving it). Racing updates to the same order are not serialized
    /// here; the terminal states bound the damage to one extra write.
    pub async fn update_status(
        &self,
        user: &CurrentUser,
        order_id: &str,
        new_status: OrderStatus,
        reason: Option<String>,
    ) -> AppResult<Order> {
        let mut order = self.load_order(order_id).await?;
        let restaurant = self.load_restaurant(&order.restaurant_id).await?;

        if !user.is_admin() && !(user.is_restaurant_owner() && restaurant.owner_id == user.id) {
            return Err(AppError::forbidden(
                "Only the restaurant or an admin may update this order",
            ));
        }

        if !order.status.can_transition_to(new_status) {
            return Err(AppError::with_message(
                ErrorCode::InvalidTransition,
                format!(
                    "Cannot change order status from {} to {}",
                    order.status, new_status
                ),
            )
            .with_detail("from", order.status.as_str())
            .with_detail("to", new_status.as_str()));
        }

        let now = Utc::now();
        let previous = order.status;
        order.status = new_status;

        match new_status {
            OrderStatus::Delivered => {
                order.delivered_at = Some(now);
                // COD is collected by the courier at the door
                if order.payment_method == PaymentMethod::Cod {
                    order.payment_status = PaymentStatus::Paid;
                }
            }
            OrderStatus::Cancelled => {
                order.cancelled_at = Some(now);
                order.cancellation_reason =
                    Some(reason.unwrap_or_else(|| "Cancelled by restaurant".to_string()));
            }
            _ => {}
        }

        let order = self.orders.update(order).await?;

        // Settlement runs exactly once: the transition guard above only
        // admits out_for_delivery -> delivered, and delivered is terminal.
        if new_status == OrderStatus::Delivered {
            let commission = percentage(order.total, restaurant.commission_rate);
            let earnings = order.total - commission;
            self.restaurants
                .add_earnings(&order.restaurant_id, earnings)
                .await?;
            tracing::info!(
                order_id = %order.id,
                restaurant_id = %order.restaurant_id,
                earnings,
                commission,
                "Order delivered, earnings settled"
            );
        }

        tracing::info!(
            order_id = %order.id,
            from = %previous,
            to = %new_status,
            "Order status updated"
        );

        self.notifier.notify_user_order_update(&order.user_id, &order);

        if matches!(
            new_status,
            OrderStatus::OutForDelivery | OrderStatus::Delivered
        ) {
            self.notifier.notify_delivery_update(
                &order.id,
                json!({
                    "orderId": order.id,
                    "status": order.status,
                    "estimatedDelivery": order.estimated_delivery,
                }),
            );
        }

        Ok(order)
    }

    /// User-initiated cancellation, allowed only before the kitchen
    /// starts preparing.
    pub async fn cancel_order(
        &self,
        user: &CurrentUser,
        order_id: &str,
        reason: Option<String>,
    ) -> AppResult<Order> {
        let mut order = self.load_order(order_id).await?;

        if !order.is_owned_by(&user.id) {
            return Err(AppError::forbidden("This is not your order"));
        }

        if !matches!(order.status, OrderStatus::Pending | OrderStatus::Confirmed) {
            return Err(AppError::with_message(
                ErrorCode::InvalidTransition,
                "Order cannot be cancelled at this stage",
            )
            .with_detail("status", order.status.as_str()));
        }

        order.status = OrderStatus::Cancelled;
        order.cancelled_at = Some(Utc::now());
        order.cancellation_reason =
            Some(reason.unwrap_or_else(|| "Cancelled by user".to_string()));

        let order = self.orders.update(order).await?;

        tracing::info!(order_id = %order.id, user_id = %user.id, "Order cancelled by user");

        Ok(order)
    }

    /// Record an external payment confirmation. Idempotent when the
    /// order is already paid.
    pub async fn confirm_payment(&self, user: &CurrentUser, order_id: &str) -> AppResult<Order> {
        if !user.is_admin() {
            return Err(AppError::forbidden("Admin access required"));
        }

        let mut order = self.load_order(order_id).await?;

        match order.payment_status {
            PaymentStatus::Paid => return Ok(order),
            PaymentStatus::Failed => {
                return Err(AppError::with_message(
                    ErrorCode::PaymentNotConfirmable,
                    "Payment for this order has already failed",
                ));
            }
            PaymentStatus::Pending => {}
        }

        order.payment_status = PaymentStatus::Paid;
        let order = self.orders.update(order).await?;

        tracing::info!(order_id = %order.id, "Payment confirmed");

        self.notifier.notify_user_order_update(&order.user_id, &order);

        Ok(order)
    }

    // ==================== internals ====================

    async fn load_order(&self, order_id: &str) -> AppResult<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))
    }

    async fn load_restaurant(&self, restaurant_id: &str) -> AppResult<Restaurant> {
        self.restaurants
            .get_restaurant(restaurant_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))
    }

    /// Restaurant lookup for checkout: must exist, be live on the
    /// platform, and currently accept orders.
    async fn load_orderable_restaurant(&self, restaurant_id: &str) -> AppResult<Restaurant> {
        let restaurant = self.load_restaurant(restaurant_id).await?;

        if !restaurant.is_active || !restaurant.is_approved {
            return Err(AppError::new(ErrorCode::RestaurantUnavailable));
        }
        if !restaurant.accepting_orders {
            return Err(AppError::new(ErrorCode::RestaurantClosed));
        }

        Ok(restaurant)
    }

    /// Resolve a coupon code to its canonical form and discount amount.
    /// Any ineligibility skips the discount without failing the order.
    /// Redemption is a separate step, taken only once the order is
    /// certain to be inserted.
    async fn resolve_coupon(
        &self,
        code: &str,
        subtotal: Money,
        restaurant_id: &str,
        user_id: &str,
    ) -> AppResult<Option<(String, Money)>> {
        let canonical = Coupon::normalize_code(code);

        let Some(coupon) = self.coupons.get_coupon(&canonical).await? else {
            tracing::debug!(code = %canonical, "Coupon not found, skipping discount");
            return Ok(None);
        };

        let Some(amount) = evaluate_coupon(&coupon, subtotal, restaurant_id, user_id, Utc::now())
        else {
            tracing::debug!(code = %canonical, "Coupon not applicable, skipping discount");
            return Ok(None);
        };

        Ok(Some((canonical, amount)))
    }

    async fn authorize_view(&self, user: &CurrentUser, order: &Order) -> AppResult<()> {
        if user.is_admin() || order.is_owned_by(&user.id) {
            return Ok(());
        }
        if user.is_restaurant_owner() {
            let restaurant = self.load_restaurant(&order.restaurant_id).await?;
            if restaurant.owner_id == user.id {
                return Ok(());
            }
        }
        Err(AppError::forbidden("You may not view this order"))
    }
}
