use std::sync::Arc;

use crate::auth::password::PasswordHasher;
use crate::auth::user::User;
use crate::error::{RestoAuthError, Result};
use crate::storage::StorageProvider;

/// Checks a username/password pair against stored accounts
pub struct CredentialAuthenticator {
    storage: Arc<dyn StorageProvider>,
    hasher: PasswordHasher,
}

impl CredentialAuthenticator {
    pub fn new(storage: Arc<dyn StorageProvider>, hasher: PasswordHasher) -> Self {
        Self { storage, hasher }
    }

    /// Returns the user on a match. An unknown username and a wrong password
    /// both fail with `InvalidCredentials`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = self.storage.user_storage().find_by_username(username).await?;

        let matched = match &user {
            Some(user) => self.hasher.verify(password, &user.password_hash).await?,
            None => self.hasher.verify_dummy(password).await?,
        };

        match user {
            Some(user) if matched => Ok(user),
            _ => {
                log::warn!("Failed login attempt");
                Err(RestoAuthError::InvalidCredentials)
            }
        }
    }
}
