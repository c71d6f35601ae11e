//! In-memory storage implementation for development and testing
//!
//! All tables live behind a single lock so that multi-row operations
//! (tenant provisioning, refresh session replacement) are atomic.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::*;
use crate::auth::user::{NewUser, User};
use crate::error::{RestoAuthError, Result};
use crate::tenant::{NewRestaurant, Restaurant};

const DUPLICATE_ACCOUNT: &str = "Username or email already exists";

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    user_by_username: HashMap<String, Uuid>,
    user_by_email: HashMap<String, Uuid>,
    restaurants: HashMap<Uuid, Restaurant>,
    restaurant_by_owner: HashMap<String, Uuid>,
    refresh_tokens: HashMap<String, StoredRefreshToken>, // token_hash -> session
    refresh_by_user: HashMap<Uuid, String>,               // user_id -> token_hash
}

impl Tables {
    fn check_user_unique(&self, user: &NewUser) -> Result<()> {
        if self.user_by_username.contains_key(&user.username)
            || self.user_by_email.contains_key(&user.email)
        {
            return Err(RestoAuthError::DuplicateResource(DUPLICATE_ACCOUNT.to_string()));
        }
        Ok(())
    }

    fn check_restaurant_unique(&self, restaurant: &NewRestaurant) -> Result<()> {
        if self.restaurant_by_owner.contains_key(&restaurant.owner) {
            return Err(RestoAuthError::DuplicateResource(format!(
                "Restaurant already exists for owner {}",
                restaurant.owner
            )));
        }
        Ok(())
    }

    fn insert_restaurant(&mut self, restaurant: NewRestaurant) -> Restaurant {
        let restaurant = restaurant.into_restaurant(Uuid::new_v4());
        self.restaurant_by_owner
            .insert(restaurant.owner.clone(), restaurant.id);
        self.restaurants.insert(restaurant.id, restaurant.clone());
        restaurant
    }

    fn insert_user(&mut self, user: NewUser, restaurant_id: Uuid) -> User {
        let user = user.into_user(Uuid::new_v4(), restaurant_id);
        self.user_by_username.insert(user.username.clone(), user.id);
        self.user_by_email.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user.clone());
        user
    }

    fn remove_refresh_for_user(&mut self, user_id: Uuid) -> bool {
        match self.refresh_by_user.remove(&user_id) {
            Some(token_hash) => {
                self.refresh_tokens.remove(&token_hash);
                true
            }
            None => false,
        }
    }
}

/// In-memory implementation of every storage trait
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Number of stored users
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    /// Number of stored restaurants
    pub async fn restaurant_count(&self) -> usize {
        self.tables.read().await.restaurants.len()
    }

    /// Number of stored refresh sessions
    pub async fn refresh_token_count(&self) -> usize {
        self.tables.read().await.refresh_tokens.len()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStorage for MemoryStorage {
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .user_by_username
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn save(&self, user: NewUser, restaurant_id: Uuid) -> Result<User> {
        let mut tables = self.tables.write().await;
        if !tables.restaurants.contains_key(&restaurant_id) {
            return Err(RestoAuthError::StorageError(format!(
                "Restaurant {} does not exist",
                restaurant_id
            )));
        }
        tables.check_user_unique(&user)?;
        Ok(tables.insert_user(user, restaurant_id))
    }
}

#[async_trait]
impl RestaurantStorage for MemoryStorage {
    async fn save(&self, restaurant: NewRestaurant) -> Result<Restaurant> {
        let mut tables = self.tables.write().await;
        tables.check_restaurant_unique(&restaurant)?;
        Ok(tables.insert_restaurant(restaurant))
    }

    async fn find_by_owner(&self, username: &str) -> Result<Option<Restaurant>> {
        let tables = self.tables.read().await;
        Ok(tables
            .restaurant_by_owner
            .get(username)
            .and_then(|id| tables.restaurants.get(id))
            .cloned())
    }
}

#[async_trait]
impl RefreshTokenStorage for MemoryStorage {
    async fn replace_for_user(&self, token: StoredRefreshToken) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&token.user_id) {
            return Err(RestoAuthError::StorageError(format!(
                "User {} does not exist",
                token.user_id
            )));
        }
        tables.remove_refresh_for_user(token.user_id);
        tables
            .refresh_by_user
            .insert(token.user_id, token.token_hash.clone());
        tables.refresh_tokens.insert(token.token_hash.clone(), token);
        Ok(())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<StoredRefreshToken>> {
        Ok(self.tables.read().await.refresh_tokens.get(token_hash).cloned())
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<bool> {
        Ok(self.tables.write().await.remove_refresh_for_user(user_id))
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    fn user_storage(&self) -> &dyn UserStorage {
        self
    }

    fn restaurant_storage(&self) -> &dyn RestaurantStorage {
        self
    }

    fn refresh_token_storage(&self) -> &dyn RefreshTokenStorage {
        self
    }

    async fn provision_tenant(
        &self,
        restaurant: NewRestaurant,
        owner: NewUser,
    ) -> Result<(Restaurant, User)> {
        let mut tables = self.tables.write().await;

        // Check every constraint before the first insert
        tables.check_restaurant_unique(&restaurant)?;
        tables.check_user_unique(&owner)?;

        let restaurant = tables.insert_restaurant(restaurant);
        let user = tables.insert_user(owner, restaurant.id);
        Ok((restaurant, user))
    }
}

/// Shared reference to the in-memory storage
pub type SharedMemoryStorage = Arc<MemoryStorage>;

/// Create a new in-memory storage
pub fn create_memory_storage() -> SharedMemoryStorage {
    Arc::new(MemoryStorage::new())
}
