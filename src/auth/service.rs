//! Public authentication operations
//!
//! Wires the token codec, refresh sessions, credential check, registration
//! and request gate together behind one handle shared by the HTTP layer.

use serde::Serialize;
use std::sync::Arc;

use crate::auth::credentials::CredentialAuthenticator;
use crate::auth::gate::{self, Identity};
use crate::auth::password::PasswordHasher;
use crate::auth::registration::{RegisterRequest, RegistrationService};
use crate::auth::session::RefreshSessionStore;
use crate::auth::token::{TokenKind, TokenManager};
use crate::auth::user::User;
use crate::config::AuthConfig;
use crate::error::{RestoAuthError, Result};
use crate::storage::StorageProvider;

/// Tokens handed out at login
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthService {
    tokens: TokenManager,
    sessions: RefreshSessionStore,
    credentials: CredentialAuthenticator,
    registration: RegistrationService,
}

impl AuthService {
    pub fn new(config: &AuthConfig, storage: Arc<dyn StorageProvider>) -> Result<Self> {
        let hasher = PasswordHasher::new(config.password_hash)?;
        Ok(Self {
            tokens: TokenManager::from_config(config),
            sessions: RefreshSessionStore::new(storage.clone(), config.refresh_session_ttl),
            credentials: CredentialAuthenticator::new(storage.clone(), hasher.clone()),
            registration: RegistrationService::new(storage, hasher),
        })
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Checks credentials and starts a new refresh session, replacing any old one
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        let user = self.credentials.authenticate(username, password).await?;

        let access_token = self.tokens.issue(&user.username, TokenKind::Access)?;
        let refresh_token = self.tokens.issue(&user.username, TokenKind::Refresh)?;
        self.sessions.create(&user, &refresh_token).await?;

        log::info!("User {} logged in", user.username);
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Mints a new access token from the refresh cookie
    pub async fn refresh_access_token(&self, refresh_token: Option<&str>) -> Result<String> {
        let refresh_token = refresh_token.ok_or(RestoAuthError::Unauthenticated)?;

        // The stored session decides freshness, not the token's own expiry
        let username = self
            .tokens
            .extract_subject(refresh_token, TokenKind::Refresh, true)
            .map_err(|e| {
                log::debug!("Refresh rejected: {}", e);
                RestoAuthError::Unauthenticated
            })?;

        if !self.sessions.validate(&username, refresh_token).await? {
            log::debug!("Refresh rejected: no live session for {}", username);
            return Err(RestoAuthError::Unauthenticated);
        }

        self.tokens.issue(&username, TokenKind::Access)
    }

    /// Revokes the session named by the refresh cookie, if it decodes
    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<()> {
        let Some(refresh_token) = refresh_token else {
            return Ok(());
        };

        match self
            .tokens
            .extract_subject(refresh_token, TokenKind::Refresh, true)
        {
            Ok(username) => {
                self.sessions.revoke(&username).await?;
                log::info!("User {} logged out", username);
            }
            Err(e) => log::debug!("Logout with unreadable refresh token: {}", e),
        }
        Ok(())
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        self.registration.register(request).await
    }

    pub fn authenticate_request(
        &self,
        cookie_token: Option<&str>,
        authorization_header: Option<&str>,
    ) -> Option<Identity> {
        gate::authenticate_request(&self.tokens, cookie_token, authorization_header)
    }
}

/// Shared reference to the auth service
pub type SharedAuthService = Arc<AuthService>;
