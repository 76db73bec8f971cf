//! Order pricing
//!
//! All amounts are integer minor units. The single fractional input is
//! the tax rate; the rounding step happens exactly once, in
//! [`shared::money::percentage`].

use rust_decimal::Decimal;
use shared::models::{MenuItem, OrderItem};
use shared::money::percentage;
use shared::{AppError, AppResult, ErrorCode, Money};

/// Flat tax rate applied to the item subtotal, in percent
pub const TAX_RATE_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Price one requested line against the catalog item, snapshotting
/// name, unit price, and image onto the order.
pub fn price_line(item: &MenuItem, quantity: u32) -> AppResult<OrderItem> {
    if quantity == 0 {
        return Err(
            AppError::validation("Item quantity must be at least 1")
                .with_detail("menuItemId", item.id.clone()),
        );
    }

    if !item.is_available {
        return Err(AppError::with_message(
            ErrorCode::MenuItemUnavailable,
            format!("{} is currently unavailable", item.name),
        ));
    }

    Ok(OrderItem {
        menu_item_id: item.id.clone(),
        name: item.name.clone(),
        price: item.price,
        quantity,
        image: item.image.clone(),
    })
}

/// Derived order amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub tax: Money,
    pub total: Money,
}

/// `total = subtotal + delivery_fee + tax - discount`, clamped at zero.
/// Tax is computed on the undiscounted subtotal.
pub fn compute_totals(subtotal: Money, delivery_fee: Money, discount: Money) -> Totals {
    let tax = percentage(subtotal, TAX_RATE_PERCENT);
    let total = (subtotal + delivery_fee + tax - discount).max(0);
    Totals { tax, total }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: Money, available: bool) -> MenuItem {
        MenuItem {
            id: "item-1".to_string(),
            restaurant_id: "rest-1".to_string(),
            name: "Paneer Roll".to_string(),
            price,
            image: None,
            is_available: available,
        }
    }

    #[test]
    fn test_price_line_snapshots_catalog_fields() {
        let line = price_line(&item(125, true), 2).unwrap();
        assert_eq!(line.name, "Paneer Roll");
        assert_eq!(line.price, 125);
        assert_eq!(line.line_total(), 250);
    }

    #[test]
    fn test_price_line_rejects_zero_quantity() {
        let err = price_line(&item(125, true), 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_price_line_rejects_unavailable_item() {
        let err = price_line(&item(125, false), 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::MenuItemUnavailable);
    }

    #[test]
    fn test_totals_reference_breakdown() {
        // 250 subtotal, 30 delivery, 5% tax on subtotal
        let t = compute_totals(250, 30, 0);
        assert_eq!(t.tax, 12);
        assert_eq!(t.total, 292);
    }

    #[test]
    fn test_totals_discount_cannot_push_total_negative() {
        let t = compute_totals(100, 0, 500);
        assert_eq!(t.total, 0);
    }

    #[test]
    fn test_tax_uses_bankers_rounding() {
        assert_eq!(compute_totals(70, 0, 0).tax, 4);
        assert_eq!(compute_totals(50, 0, 0).tax, 2);
        assert_eq!(compute_totals(999, 0, 0).tax, 50);
    }
}
