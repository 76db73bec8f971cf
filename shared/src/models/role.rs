//! User roles

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role carried in the auth token, issued by the upstream auth layer.
///
/// A closed set: it decides both API authorization and which partition of
/// the connection registry a real-time socket binds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    RestaurantOwner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::RestaurantOwner => "restaurant_owner",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
