//! Money arithmetic in integer minor units
//!
//! All monetary amounts are stored as [`Money`] (integer minor units, e.g.
//! cents). Percentage calculations go through `rust_decimal` and round to a
//! whole minor unit with banker's rounding, so repeated calculations never
//! accumulate floating-point drift. Totals are compared for exact equality
//! (the duplicate-order guard depends on this), which rules out `f64`.

use rust_decimal::prelude::*;

/// Monetary amount in minor units (e.g. cents).
pub type Money = i64;

/// Compute `percent`% of `amount`, rounded to a whole minor unit.
///
/// Uses banker's rounding (`Decimal::round`): 5% of 250 is 12, not 13.
pub fn percentage(amount: Money, percent: Decimal) -> Money {
    let exact = Decimal::from(amount) * percent / Decimal::ONE_HUNDRED;
    exact.round().to_i64().unwrap_or(0)
}
