//! Account registration with automatic restaurant provisioning

use serde::Deserialize;
use std::sync::Arc;

use crate::auth::password::PasswordHasher;
use crate::auth::user::{NewUser, User, UserRole};
use crate::constants::{ALLOWED_EMAIL_DOMAIN, MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH};
use crate::error::{RestoAuthError, Result};
use crate::storage::StorageProvider;
use crate::tenant::NewRestaurant;

/// Registration form
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
    pub email: String,
}

type Rule = (fn(&RegisterRequest) -> bool, &'static str);

/// Checked in order; the first failing rule is reported
const RULES: &[Rule] = &[
    (
        |req| req.username.chars().count() >= MIN_USERNAME_LENGTH,
        "Username must be at least 6 characters long",
    ),
    (
        |req| req.password.chars().count() >= MIN_PASSWORD_LENGTH,
        "Password must be at least 6 characters long",
    ),
    (
        |req| req.password == req.confirm_password,
        "Passwords do not match",
    ),
    (
        |req| req.email.to_lowercase().ends_with(ALLOWED_EMAIL_DOMAIN),
        "Only Gmail addresses are allowed",
    ),
];

impl RegisterRequest {
    pub fn validate(&self) -> Result<()> {
        match RULES.iter().find(|(passes, _)| !passes(self)) {
            Some((_, message)) => Err(RestoAuthError::ValidationError(message.to_string())),
            None => Ok(()),
        }
    }
}

pub struct RegistrationService {
    storage: Arc<dyn StorageProvider>,
    hasher: PasswordHasher,
}

impl RegistrationService {
    pub fn new(storage: Arc<dyn StorageProvider>, hasher: PasswordHasher) -> Self {
        Self { storage, hasher }
    }

    /// Validates the form, then creates the owner and their restaurant together
    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        request.validate()?;

        let owner = NewUser {
            username: request.username.clone(),
            email: request.email,
            password_hash: self.hasher.hash(&request.password).await?,
            role: UserRole::Owner,
        };

        match self
            .storage
            .provision_tenant(NewRestaurant::for_owner(&request.username), owner)
            .await
        {
            Ok((restaurant, user)) => {
                log::info!(
                    "Registered {} with restaurant \"{}\"",
                    user.username,
                    restaurant.name
                );
                Ok(user)
            }
            Err(RestoAuthError::DuplicateResource(_)) => {
                log::warn!("Registration conflict for {}", request.username);
                Err(RestoAuthError::DuplicateResource(
                    "Username or email already exists".to_string(),
                ))
            }
            Err(e) => Err(e),
        }
    }
}
