//! Order model and status state machine

use crate::models::address::AddressSnapshot;
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order workflow status.
///
/// Legal transitions form a single forward chain with one side exit:
///
/// ```text
/// pending → confirmed → preparing → ready → out_for_delivery → delivered
///    │           │
///    └───────────┴──→ cancelled
/// ```
///
/// `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Preparing)
                | (Preparing, Ready)
                | (Ready, OutForDelivery)
                | (OutForDelivery, Delivered)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(()),
        }
    }
}

/// Payment method chosen at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery, collected by the courier
    #[default]
    Cod,
    Card,
    Upi,
}

/// Payment state. Card/UPI orders stay `pending` until the external
/// gateway confirms; COD orders stay `pending` until delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

/// Delivery destination: exactly one of a stored-address reference or an
/// inline snapshot. Untagged so the wire shape stays `{"addressId": ...}`
/// or `{"address": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeliveryAddress {
    #[serde(rename_all = "camelCase")]
    Saved { address_id: String },
    Inline { address: AddressSnapshot },
}

impl DeliveryAddress {
    /// Build from the two optional request fields, enforcing "exactly one".
    pub fn from_parts(
        address_id: Option<String>,
        address: Option<AddressSnapshot>,
    ) -> crate::error::AppResult<Self> {
        match (address_id, address) {
            (Some(address_id), None) => Ok(Self::Saved { address_id }),
            (None, Some(address)) => Ok(Self::Inline { address }),
            (None, None) => Err(crate::error::AppError::invalid(
                "Delivery address is required",
            )),
            (Some(_), Some(_)) => Err(crate::error::AppError::invalid(
                "Provide either a saved address or an inline address, not both",
            )),
        }
    }
}

/// Order line item. `name`, `price`, and `image` are snapshots taken at
/// order time and stay fixed through later catalog edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub menu_item_id: String,
    pub name: String,
    /// Unit price in minor units, snapshotted
    pub price: Money,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl OrderItem {
    /// Line total in minor units
    pub fn line_total(&self) -> Money {
        self.price * self.quantity as Money
    }
}

/// Order aggregate root.
///
/// Invariant: `total == subtotal + delivery_fee + tax - discount`, always
/// recomputed server-side, never trusted from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub restaurant_id: String,
    #[serde(flatten)]
    pub delivery_address: DeliveryAddress,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub tax: Money,
    pub discount: Money,
    /// Applied coupon, by code (snapshot semantics, not a reference)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

impl Order {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Ready));
        assert!(Ready.can_transition_to(OutForDelivery));
        assert!(OutForDelivery.can_transition_to(Delivered));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
    }

    #[test]
    fn test_illegal_transitions() {
        use OrderStatus::*;
        // No skipping ahead
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Pending.can_transition_to(Preparing));
        assert!(!Confirmed.can_transition_to(Ready));
        // No going back
        assert!(!Preparing.can_transition_to(Confirmed));
        // Cancellation closes after confirmation
        assert!(!Preparing.can_transition_to(Cancelled));
        assert!(!OutForDelivery.can_transition_to(Cancelled));
        // Terminal states are terminal
        assert!(!Delivered.can_transition_to(Delivered));
        assert!(!Cancelled.can_transition_to(Pending));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "out_for_delivery".parse::<OrderStatus>(),
            Ok(OrderStatus::OutForDelivery)
        );
        assert!("picked_up".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_delivery_address_exactly_one() {
        assert!(DeliveryAddress::from_parts(Some("addr-1".into()), None).is_ok());
        assert!(DeliveryAddress::from_parts(None, None).is_err());

        let inline = AddressSnapshot {
            label: None,
            line1: "1 Main St".into(),
            line2: None,
            city: "Pune".into(),
            postal_code: "411001".into(),
            phone: None,
        };
        assert!(DeliveryAddress::from_parts(None, Some(inline.clone())).is_ok());
        assert!(DeliveryAddress::from_parts(Some("addr-1".into()), Some(inline)).is_err());
    }
}
