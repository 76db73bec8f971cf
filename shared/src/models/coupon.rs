//! Coupon model

use crate::money::Money;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Discount kind, tagged so the value's unit is unambiguous:
/// percentage points for `Percentage`, minor units for `Fixed`.
///
/// Serializes as `{"discountType": "percentage", "discountValue": 10}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "discountType",
    content = "discountValue",
    rename_all = "snake_case"
)]
pub enum DiscountKind {
    Percentage(Decimal),
    Fixed(Money),
}

/// Coupon as seen by the order core.
///
/// Coupon CRUD is external; the order core reads coupons and atomically
/// increments `used_count` when one is applied. `used_count` only ever
/// increases and must never exceed `usage_limit` when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Unique code, stored upper-case
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub discount: DiscountKind,
    /// Minimum subtotal (minor units) for the coupon to apply
    #[serde(default)]
    pub min_order_value: Money,
    /// Cap on the computed discount, minor units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<Money>,
    pub valid_from: DateTime<Utc>,
    pub valid_till: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub used_count: u32,
    pub is_active: bool,
    /// Empty = valid at every restaurant
    #[serde(default)]
    pub applicable_restaurants: Vec<String>,
    /// Empty = valid for every user
    #[serde(default)]
    pub applicable_users: Vec<String>,
}

impl Coupon {
    /// Canonical form for lookup and storage
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(Coupon::normalize_code("  save10 "), "SAVE10");
        assert_eq!(Coupon::normalize_code("FLAT50"), "FLAT50");
    }

    #[test]
    fn test_discount_kind_wire_format() {
        let kind = DiscountKind::Percentage(Decimal::from(10));
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["discountType"], "percentage");
        assert_eq!(json["discountValue"], serde_json::json!("10"));

        let fixed: DiscountKind =
            serde_json::from_value(serde_json::json!({
                "discountType": "fixed",
                "discountValue": 50
            }))
            .unwrap();
        assert_eq!(fixed, DiscountKind::Fixed(50));
    }
}
