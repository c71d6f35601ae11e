use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role within a restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Owner,
    Staff,
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string, never serialized outward
    #[serde(skip)]
    pub password_hash: String,
    pub role: UserRole,
    /// Owning restaurant
    pub restaurant_id: Uuid,
}

/// User data before persistence assigns an id and restaurant
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

impl NewUser {
    /// Attaches storage-assigned identifiers
    pub fn into_user(self, id: Uuid, restaurant_id: Uuid) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            restaurant_id,
        }
    }
}
