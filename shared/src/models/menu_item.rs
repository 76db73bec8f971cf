//! Menu item (catalog collaborator view)

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Menu item as seen by the order core.
///
/// Catalog CRUD lives elsewhere; orders only read this view and snapshot
/// `name`/`price`/`image` into line items at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    /// Price in minor units
    pub price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub is_available: bool,
}
