//! Restaurant (tenant) model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An independently owned restaurant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    /// Username of the owning account
    pub owner: String,
}

/// Restaurant data before persistence assigns an id
#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub name: String,
    pub owner: String,
}

impl NewRestaurant {
    /// The restaurant provisioned for a freshly registered owner
    pub fn for_owner(username: &str) -> Self {
        Self {
            name: format!("{}'s Restaurant", username),
            owner: username.to_string(),
        }
    }

    pub fn into_restaurant(self, id: Uuid) -> Restaurant {
        Restaurant {
            id,
            name: self.name,
            owner: self.owner,
        }
    }
}
