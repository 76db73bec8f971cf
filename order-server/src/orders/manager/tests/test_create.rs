//! Order creation

use super::*;
use shared::ErrorCode;
use shared::models::Role;
use tokio::sync::mpsc;

use crate::realtime::BoundConnection;

#[tokio::test]
async fn test_create_order_price_breakdown() {
    let (manager, _registry) = manager_for(seeded_store());

    let order = manager
        .create_order(&customer(), basic_input())
        .await
        .unwrap();

    assert_eq!(order.subtotal, 250);
    assert_eq!(order.delivery_fee, 30);
    assert_eq!(order.tax, 12);
    assert_eq!(order.discount, 0);
    assert_eq!(order.total, 292);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(
        order.estimated_delivery - order.created_at,
        Duration::minutes(40)
    );
}

#[tokio::test]
async fn test_create_order_snapshots_catalog() {
    let store = seeded_store();
    let (manager, _registry) = manager_for(store);

    let order = manager
        .create_order(&customer(), basic_input())
        .await
        .unwrap();

    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].name, "Paneer Roll");
    assert_eq!(order.items[0].price, 100);
    assert_eq!(order.items[0].quantity, 2);
}

#[tokio::test]
async fn test_create_rejects_empty_items() {
    let (manager, _registry) = manager_for(seeded_store());

    let err = manager
        .create_order(
            &customer(),
            CreateOrderInput {
                items: vec![],
                ..basic_input()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);
}

#[tokio::test]
async fn test_create_requires_delivery_address() {
    let (manager, _registry) = manager_for(seeded_store());

    let err = manager
        .create_order(
            &customer(),
            CreateOrderInput {
                address_id: None,
                delivery_address: None,
                ..basic_input()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn test_create_unknown_restaurant() {
    let (manager, _registry) = manager_for(seeded_store());

    let err = manager
        .create_order(
            &customer(),
            CreateOrderInput {
                restaurant_id: "rest-404".to_string(),
                ..basic_input()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RestaurantNotFound);
}

#[tokio::test]
async fn test_create_restaurant_not_orderable() {
    let (manager, _registry) = manager_for(seeded_store());

    let closed = manager
        .create_order(
            &customer(),
            CreateOrderInput {
                restaurant_id: "rest-closed".to_string(),
                ..basic_input()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(closed.code, ErrorCode::RestaurantClosed);

    let hidden = manager
        .create_order(
            &customer(),
            CreateOrderInput {
                restaurant_id: "rest-hidden".to_string(),
                ..basic_input()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(hidden.code, ErrorCode::RestaurantUnavailable);
}

#[tokio::test]
async fn test_create_rejects_foreign_or_unknown_menu_item() {
    let (manager, _registry) = manager_for(seeded_store());

    // Belongs to rest-2
    let foreign = manager
        .create_order(
            &customer(),
            CreateOrderInput {
                items: vec![OrderItemInput {
                    menu_item_id: "item-other".to_string(),
                    quantity: 1,
                }],
                ..basic_input()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(foreign.code, ErrorCode::MenuItemNotFound);

    let unknown = manager
        .create_order(
            &customer(),
            CreateOrderInput {
                items: vec![OrderItemInput {
                    menu_item_id: "item-404".to_string(),
                    quantity: 1,
                }],
                ..basic_input()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(unknown.code, ErrorCode::MenuItemNotFound);
}

#[tokio::test]
async fn test_create_rejects_unavailable_item() {
    let (manager, _registry) = manager_for(seeded_store());

    let err = manager
        .create_order(
            &customer(),
            CreateOrderInput {
                items: vec![OrderItemInput {
                    menu_item_id: "item-off".to_string(),
                    quantity: 1,
                }],
                ..basic_input()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MenuItemUnavailable);
}

#[tokio::test]
async fn test_duplicate_submission_returns_existing_order() {
    let (manager, _registry) = manager_for(seeded_store());

    let first = manager
        .create_order(&customer(), basic_input())
        .await
        .unwrap();
    let second = manager
        .create_order(&customer(), basic_input())
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn test_create_notifies_restaurant_and_admins() {
    let store = seeded_store();
    let (manager, registry) = manager_for(store);

    let (staff_tx, mut staff_rx) = mpsc::channel(8);
    let mut staff = BoundConnection::bind(
        registry.clone(),
        &owner(),
        "sock-staff".to_string(),
        staff_tx,
    );
    staff.join_restaurant("rest-1");

    let (admin_tx, mut admin_rx) = mpsc::channel(8);
    let _admin_conn = BoundConnection::bind(
        registry.clone(),
        &CurrentUser {
            id: "admin-1".to_string(),
            role: Role::Admin,
        },
        "sock-admin".to_string(),
        admin_tx,
    );

    let order = manager
        .create_order(&customer(), basic_input())
        .await
        .unwrap();

    let staff_msg = staff_rx.try_recv().unwrap();
    assert!(staff_msg.contains(r#""event":"new-order""#));
    assert!(staff_msg.contains(&order.id));

    let admin_msg = admin_rx.try_recv().unwrap();
    assert!(admin_msg.contains(r#""type":"NEW_ORDER""#));
}

#[tokio::test]
async fn test_get_order_visibility() {
    let (manager, _registry) = manager_for(seeded_store());
    let order = manager
        .create_order(&customer(), basic_input())
        .await
        .unwrap();

    assert!(manager.get_order(&customer(), &order.id).await.is_ok());
    assert!(manager.get_order(&admin(), &order.id).await.is_ok());
    assert!(manager.get_order(&owner(), &order.id).await.is_ok());

    let stranger = CurrentUser {
        id: "user-2".to_string(),
        role: Role::User,
    };
    let err = manager.get_order(&stranger, &order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let err = manager
        .get_order(&other_owner(), &order.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let err = manager.get_order(&customer(), "o-404").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
}

#[tokio::test]
async fn test_list_user_orders_pagination() {
    let (manager, _registry) = manager_for(seeded_store());

    // Vary quantity so the duplicate guard never collapses them
    for quantity in 1..=3 {
        manager
            .create_order(
                &customer(),
                CreateOrderInput {
                    items: vec![OrderItemInput {
                        menu_item_id: "item-1".to_string(),
                        quantity,
                    }],
                    ..basic_input()
                },
            )
            .await
            .unwrap();
    }

    let page = manager
        .list_user_orders(&customer(), None, 1, 2)
        .await
        .unwrap();
    assert_eq!(page.total_orders, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.current_page, 1);
    assert_eq!(page.orders.len(), 2);

    let filtered = manager
        .list_user_orders(&customer(), Some(OrderStatus::Delivered), 1, 10)
        .await
        .unwrap();
    assert_eq!(filtered.total_orders, 0);
}

#[tokio::test]
async fn test_list_restaurant_orders_requires_ownership() {
    let (manager, _registry) = manager_for(seeded_store());
    manager
        .create_order(&customer(), basic_input())
        .await
        .unwrap();

    let filter = OrderFilter::default();
    let orders = manager
        .list_restaurant_orders(&owner(), "rest-1", &filter)
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);

    assert!(
        manager
            .list_restaurant_orders(&admin(), "rest-1", &filter)
            .await
            .is_ok()
    );

    let err = manager
        .list_restaurant_orders(&other_owner(), "rest-1", &filter)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}
