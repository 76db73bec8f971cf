//! Coupon evaluation
//!
//! Pure check-and-compute step. An inapplicable coupon never fails the
//! order; the caller skips the discount and proceeds. The usage counter
//! is incremented separately, through [`crate::store::CouponStore`].

use chrono::{DateTime, Utc};
use shared::Money;
use shared::models::{Coupon, DiscountKind};
use shared::money::percentage;

/// Compute the discount a coupon yields for this order, or `None` when
/// any eligibility rule fails. The returned amount is already capped at
/// `max_discount` and at the subtotal.
pub fn evaluate_coupon(
    coupon: &Coupon,
    subtotal: Money,
    restaurant_id: &str,
    user_id: &str,
    now: DateTime<Utc>,
) -> Option<Money> {
    if !coupon.is_active {
        return None;
    }
    if now < coupon.valid_from || now > coupon.valid_till {
        return None;
    }
    if subtotal < coupon.min_order_value {
        return None;
    }
    if coupon
        .usage_limit
        .is_some_and(|limit| coupon.used_count >= limit)
    {
        return None;
    }
    if !coupon.applicable_restaurants.is_empty()
        && !coupon
            .applicable_restaurants
            .iter()
            .any(|r| r == restaurant_id)
    {
        return None;
    }
    if !coupon.applicable_users.is_empty()
        && !coupon.applicable_users.iter().any(|u| u == user_id)
    {
        return None;
    }

    let raw = match &coupon.discount {
        DiscountKind::Percentage(percent) => {
            let amount = percentage(subtotal, *percent);
            match coupon.max_discount {
                Some(cap) => amount.min(cap),
                None => amount,
            }
        }
        DiscountKind::Fixed(amount) => *amount,
    };

    Some(raw.min(subtotal).max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn base_coupon(discount: DiscountKind) -> Coupon {
        Coupon {
            code: "SAVE10".to_string(),
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

    #[test]
    fn test_percentage_discount_with_cap() {
        let mut coupon = base_coupon(DiscountKind::Percentage(Decimal::from(10)));
        assert_eq!(
            evaluate_coupon(&coupon, 250, "rest-1", "user-1", Utc::now()),
            Some(25)
        );

        coupon.max_discount = Some(20);
        assert_eq!(
            evaluate_coupon(&coupon, 250, "rest-1", "user-1", Utc::now()),
            Some(20)
        );
    }

    #[test]
    fn test_percentage_discount_rounds_like_tax() {
        // 5% of 250 is 12.5, banker's rounding gives 12
        let coupon = base_coupon(DiscountKind::Percentage(Decimal::from(5)));
        assert_eq!(
            evaluate_coupon(&coupon, 250, "rest-1", "user-1", Utc::now()),
            Some(12)
        );
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let coupon = base_coupon(DiscountKind::Fixed(300));
        assert_eq!(
            evaluate_coupon(&coupon, 250, "rest-1", "user-1", Utc::now()),
            Some(250)
        );
    }

    #[test]
    fn test_inactive_or_out_of_window() {
        let mut coupon = base_coupon(DiscountKind::Fixed(50));
        coupon.is_active = false;
        assert_eq!(
            evaluate_coupon(&coupon, 250, "rest-1", "user-1", Utc::now()),
            None
        );

        let mut expired = base_coupon(DiscountKind::Fixed(50));
        expired.valid_till = Utc::now() - Duration::hours(1);
        assert_eq!(
            evaluate_coupon(&expired, 250, "rest-1", "user-1", Utc::now()),
            None
        );
    }

    #[test]
    fn test_minimum_order_value() {
        let mut coupon = base_coupon(DiscountKind::Fixed(50));
        coupon.min_order_value = 300;
        assert_eq!(
            evaluate_coupon(&coupon, 250, "rest-1", "user-1", Utc::now()),
            None
        );
        assert_eq!(
            evaluate_coupon(&coupon, 300, "rest-1", "user-1", Utc::now()),
            Some(50)
        );
    }

    #[test]
    fn test_usage_limit_exhausted() {
        let mut coupon = base_coupon(DiscountKind::Fixed(50));
        coupon.usage_limit = Some(3);
        coupon.used_count = 3;
        assert_eq!(
            evaluate_coupon(&coupon, 250, "rest-1", "user-1", Utc::now()),
            None
        );
    }

    #[test]
    fn test_restaurant_and_user_scoping() {
        let mut coupon = base_coupon(DiscountKind::Fixed(50));
        coupon.applicable_restaurants = vec!["rest-2".to_string()];
        assert_eq!(
            evaluate_coupon(&coupon, 250, "rest-1", "user-1", Utc::now()),
            None
        );
        assert_eq!(
            evaluate_coupon(&coupon, 250, "rest-2", "user-1", Utc::now()),
            Some(50)
        );

        let mut coupon = base_coupon(DiscountKind::Fixed(50));
        coupon.applicable_users = vec!["vip-1".to_string()];
        assert_eq!(
            evaluate_coupon(&coupon, 250, "rest-1", "user-1", Utc::now()),
            None
        );
    }
}
