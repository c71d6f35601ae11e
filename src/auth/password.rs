//! Argon2 password hashing
//!
//! Hashing is deliberately slow, so both operations run on tokio's blocking
//! pool instead of a request worker.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::PasswordHashConfig;
use crate::error::{RestoAuthError, Result};

/// Hashes and verifies passwords with Argon2id
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Verified against when the user does not exist, so both paths cost the same
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(config: PasswordHashConfig) -> Result<Self> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| RestoAuthError::ConfigError(format!("Invalid Argon2 parameters: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = Self::hash_with(&argon2, "resto-auth-dummy-password")?;

        Ok(Self { argon2, dummy_hash })
    }

    fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
    }

    fn verify_with(argon2: &Argon2<'_>, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => argon2.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                log::error!("Stored password hash is unreadable: {}", e);
                false
            }
        }
    }

    /// Produces a PHC-format hash of `password`
    pub async fn hash(&self, password: &str) -> Result<String> {
        let argon2 = self.argon2.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || Self::hash_with(&argon2, &password)).await?
    }

    /// Checks `password` against a stored hash
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let argon2 = self.argon2.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        Ok(tokio::task::spawn_blocking(move || Self::verify_with(&argon2, &password, &hash)).await?)
    }

    /// Burns one verification against the dummy hash; always false
    pub async fn verify_dummy(&self, password: &str) -> Result<bool> {
        let dummy = self.dummy_hash.clone();
        self.verify(password, &dummy).await.map(|_| false)
    }
}
