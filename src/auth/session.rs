//! Refresh session management
//!
//! Each user has at most one live refresh session. Logging in replaces it,
//! logging out deletes it, and validation never mutates anything.

use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::auth::user::User;
use crate::error::Result;
use crate::storage::{hash_token, StorageProvider, StoredRefreshToken};

pub struct RefreshSessionStore {
    storage: Arc<dyn StorageProvider>,
    session_ttl: Duration,
}

impl RefreshSessionStore {
    pub fn new(storage: Arc<dyn StorageProvider>, session_ttl: Duration) -> Self {
        Self {
            storage,
            session_ttl,
        }
    }

    /// Replaces the user's session with one for `token`
    pub async fn create(&self, user: &User, token: &str) -> Result<()> {
        let session = StoredRefreshToken::new(user.id, token, Utc::now() + self.session_ttl);
        self.storage
            .refresh_token_storage()
            .replace_for_user(session)
            .await?;
        log::debug!("Refresh session created for {}", user.username);
        Ok(())
    }

    /// True only if `token` is the live session of `username`
    pub async fn validate(&self, username: &str, token: &str) -> Result<bool> {
        let session = match self
            .storage
            .refresh_token_storage()
            .find_by_token_hash(&hash_token(token))
            .await?
        {
            Some(session) => session,
            None => return Ok(false),
        };

        let owner = self.storage.user_storage().find_by_id(session.user_id).await?;
        if owner.map_or(true, |owner| owner.username != username) {
            log::warn!("Refresh token presented for a different user than its owner");
            return Ok(false);
        }

        Ok(session.is_live_at(Utc::now()))
    }

    /// Deletes the user's session. Unknown users and missing sessions are no-ops.
    pub async fn revoke(&self, username: &str) -> Result<()> {
        let user = match self.storage.user_storage().find_by_username(username).await? {
            Some(user) => user,
            None => return Ok(()),
        };

        if self
            .storage
            .refresh_token_storage()
            .delete_by_user_id(user.id)
            .await?
        {
            log::info!("Refresh session revoked for {}", username);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::user::{NewUser, UserRole};
    use crate::storage::MemoryStorage;
    use crate::tenant::NewRestaurant;

    async fn setup(ttl: Duration) -> (Arc<MemoryStorage>, RefreshSessionStore, User) {
        let storage = Arc::new(MemoryStorage::new());
        let (_, user) = storage
            .provision_tenant(
                NewRestaurant::for_owner("alice01"),
                NewUser {
                    username: "alice01".to_string(),
                    email: "alice01@gmail.com".to_string(),
                    password_hash: "hash".to_string(),
                    role: UserRole::Owner,
                },
            )
            .await
            .unwrap();
        let sessions = RefreshSessionStore::new(storage.clone(), ttl);
        (storage, sessions, user)
    }

    #[tokio::test]
    async fn test_create_then_validate() {
        let (_, sessions, user) = setup(Duration::days(7)).await;
        sessions.create(&user, "token-a").await.unwrap();
        assert!(sessions.validate("alice01", "token-a").await.unwrap());
        assert!(!sessions.validate("alice01", "token-b").await.unwrap());
    }

    #[tokio::test]
    async fn test_validate_rejects_other_username() {
        let (_, sessions, user) = setup(Duration::days(7)).await;
        sessions.create(&user, "token-a").await.unwrap();
        assert!(!sessions.validate("mallory", "token-a").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_session_fails_closed() {
        let (storage, sessions, user) = setup(Duration::seconds(-1)).await;
        sessions.create(&user, "token-a").await.unwrap();
        assert!(!sessions.validate("alice01", "token-a").await.unwrap());
        // Validation does not clean up
        assert_eq!(storage.refresh_token_count().await, 1);
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let (storage, sessions, user) = setup(Duration::days(7)).await;
        sessions.create(&user, "token-a").await.unwrap();
        sessions.revoke("alice01").await.unwrap();
        sessions.revoke("alice01").await.unwrap();
        sessions.revoke("nobody").await.unwrap();
        assert!(!sessions.validate("alice01", "token-a").await.unwrap());
        assert_eq!(storage.refresh_token_count().await, 0);
    }
}
