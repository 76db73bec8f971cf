//! Order manager test fixtures

mod test_create;

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use shared::models::{Coupon, DiscountKind, MenuItem, Restaurant, Role};

use super::*;
use crate::realtime::{ConnectionRegistry, NotificationRouter};
use crate::store::MemoryStore;

fn restaurant(id: &str, owner_id: &str) -> Restaurant {
    Restaurant {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        name: format!("Restaurant {}", id),
        is_active: true,
        is_approved: true,
        accepting_orders: true,
        delivery_fee: 30,
        delivery_time_minutes: Some(40),
        commission_rate: Decimal::from(10),
        total_earnings: 0,
    }
}

fn menu_item(id: &str, restaurant_id: &str, name: &str, price: i64, available: bool) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        restaurant_id: restaurant_id.to_string(),
        name: name.to_string(),
        price,
        image: None,
        is_available: available,
    }
}

fn coupon(code: &str, discount: DiscountKind) -> Coupon {
    Coupon {
        code: code.to_string(),
        description: None,
        discount,
        min_order_value: 0,
        max_discount: None,
        valid_from: Utc::now() - Duration::days(1),
        valid_till: Utc::now() + Duration::days(1),
        usage_limit: None,
        used_count: 0,
        is_active: true,
        applicable_restaurants: vec![],
        applicable_users: vec![],
    }
}

fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());

    store.upsert_restaurant(restaurant("rest-1", "owner-1"));
    store.upsert_restaurant(restaurant("rest-2", "owner-2"));
    store.upsert_restaurant(Restaurant {
        accepting_orders: false,
        ..restaurant("rest-closed", "owner-1")
    });
    store.upsert_restaurant(Restaurant {
        is_approved: false,
        ..restaurant("rest-hidden", "owner-1")
    });

    store.upsert_menu_item(menu_item("item-1", "rest-1", "Paneer Roll", 100, true));
    store.upsert_menu_item(menu_item("item-2", "rest-1", "Masala Chai", 50, true));
    store.upsert_menu_item(menu_item("item-off", "rest-1", "Seasonal Special", 80, false));
    store.upsert_menu_item(menu_item("item-other", "rest-2", "Veg Thali", 60, true));

    store.upsert_coupon(coupon("SAVE10", DiscountKind::Percentage(Decimal::from(10))));
    store.upsert_coupon(Coupon {
        min_order_value: 200,
        ..coupon("FLAT50", DiscountKind::Fixed(50))
    });
    store.upsert_coupon(Coupon {
        usage_limit: Some(1),
        ..coupon("LIMITED", DiscountKind::Fixed(20))
    });

    store
}

fn manager_for(store: Arc<MemoryStore>) -> (OrderManager, Arc<ConnectionRegistry>) {
    let registry = Arc::new(ConnectionRegistry::new());
    let notifier = NotificationRouter::new(registry.clone());
    let manager = OrderManager::new(
        store.clone() as Arc<dyn OrderRepository>,
        store.clone() as Arc<dyn RestaurantProvider>,
        store.clone() as Arc<dyn CatalogProvider>,
        store as Arc<dyn CouponStore>,
        notifier,
    );
    (manager, registry)
}

fn customer() -> CurrentUser {
    CurrentUser {
        id: "user-1".to_string(),
        role: Role::User,
    }
}

fn admin() -> CurrentUser {
    CurrentUser {
        id: "admin-1".to_string(),
        role: Role::Admin,
    }
}

fn owner() -> CurrentUser {
    CurrentUser {
        id: "owner-1".to_string(),
        role: Role::RestaurantOwner,
    }
}

fn other_owner() -> CurrentUser {
    CurrentUser {
        id: "owner-2".to_string(),
        role: Role::RestaurantOwner,
    }
}

/// 2x Paneer Roll + 1x Masala Chai: subtotal 250, fee 30, tax 12
fn basic_input() -> CreateOrderInput {
    CreateOrderInput {
        restaurant_id: "rest-1".to_string(),
        address_id: Some("addr-1".to_string()),
        delivery_address: None,
        items: vec![
            OrderItemInput {
                menu_item_id: "item-1".to_string(),
                quantity: 2,
            },
            OrderItemInput {
                menu_item_id: "item-2".to_string(),
                quantity: 1,
            },
        ],
        coupon_code: None,
        delivery_instructions: None,
        payment_method: PaymentMethod::Cod,
    }
}
