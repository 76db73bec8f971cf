//! Restaurant (collaborator view)

use crate::money::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Restaurant as seen by the order core.
///
/// Profile management is an external concern; the order core reads the
/// acceptance flags, pricing parameters, and settles earnings into
/// `total_earnings` on delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    /// Account that manages this restaurant (established post-registration)
    pub owner_id: String,
    pub name: String,
    pub is_active: bool,
    pub is_approved: bool,
    pub accepting_orders: bool,
    /// Flat delivery fee in minor units
    pub delivery_fee: Money,
    /// Estimated preparation + delivery time; `None` falls back to a default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time_minutes: Option<u32>,
    /// Percentage of the order total retained by the platform
    pub commission_rate: Decimal,
    /// Running earnings ledger in minor units
    pub total_earnings: Money,
}
