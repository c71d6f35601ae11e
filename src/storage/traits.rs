//! Abstract storage interfaces for pluggable backends
//!
//! This module defines traits for account, tenant and refresh-session
//! persistence. Uniqueness violations surface as `DuplicateResource`.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::user::{NewUser, User};
use crate::error::Result;
use crate::tenant::{NewRestaurant, Restaurant};

/// A persisted refresh session. Only the token hash is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredRefreshToken {
    pub fn new(user_id: Uuid, token: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash: hash_token(token),
            created_at: Utc::now(),
            expires_at,
        }
    }

    /// Whether the session is still usable at `now`
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// SHA-256 of a bearer token, base64url encoded
pub fn hash_token(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}

/// User data storage interface
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Get user by ID
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;

    /// Get user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Persist a new user belonging to `restaurant_id`
    async fn save(&self, user: NewUser, restaurant_id: Uuid) -> Result<User>;
}

/// Restaurant (tenant) storage interface
#[async_trait]
pub trait RestaurantStorage: Send + Sync {
    /// Persist a new restaurant
    async fn save(&self, restaurant: NewRestaurant) -> Result<Restaurant>;

    /// Get the restaurant owned by a username
    async fn find_by_owner(&self, username: &str) -> Result<Option<Restaurant>>;
}

/// Refresh session storage interface
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Delete any session of `token.user_id` and insert `token`, atomically
    async fn replace_for_user(&self, token: StoredRefreshToken) -> Result<()>;

    /// Look up a session by token hash
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<StoredRefreshToken>>;

    /// Delete the session of a user; returns whether one existed
    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<bool>;
}

/// Combined storage provider interface
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Get user storage backend
    fn user_storage(&self) -> &dyn UserStorage;

    /// Get restaurant storage backend
    fn restaurant_storage(&self) -> &dyn RestaurantStorage;

    /// Get refresh session storage backend
    fn refresh_token_storage(&self) -> &dyn RefreshTokenStorage;

    /// Create a restaurant and its owner as one unit. Either both rows are
    /// committed or neither is.
    async fn provision_tenant(
        &self,
        restaurant: NewRestaurant,
        owner: NewUser,
    ) -> Result<(Restaurant, User)>;

    /// Health check for the storage backend
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
