use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::constants::BEARER_PREFIX;
use crate::error::{RestoAuthError, Result};

/// Class of a bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issued at (as UTC timestamp)
    pub iat: i64,
    /// Expiration time (as UTC timestamp)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
    /// Token class
    #[serde(rename = "typ")]
    pub kind: TokenKind,
}

impl Claims {
    /// Creates claims for `subject` that expire `lifetime` from now
    pub fn new(subject: &str, kind: TokenKind, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            jti: Uuid::new_v4().to_string(),
            kind,
        }
    }

    /// Expiry as a UTC instant
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Signs and verifies access and refresh tokens with one shared HMAC key
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenManager {
    /// Creates a new token manager with a secret and per-class lifetimes
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            config.access_token_ttl,
            config.refresh_token_ttl,
        )
    }

    /// Lifetime configured for a token class
    pub fn lifetime(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    fn validation(allow_expired: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = !allow_expired;
        validation
    }

    /// Issues a signed token of the given class for `subject`
    pub fn issue(&self, subject: &str, kind: TokenKind) -> Result<String> {
        let claims = Claims::new(subject, kind, self.lifetime(kind));
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| RestoAuthError::SystemError(format!("Failed to sign token: {}", e)))
    }

    /// Validates signature, class and (unless `allow_expired`) expiry
    pub fn verify(&self, token: &str, kind: TokenKind, allow_expired: bool) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &Self::validation(allow_expired))
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => RestoAuthError::ExpiredToken,
                _ => RestoAuthError::MalformedToken,
            })?;

        if data.claims.kind != kind {
            log::debug!(
                "Token class mismatch: expected {:?}, got {:?}",
                kind,
                data.claims.kind
            );
            return Err(RestoAuthError::MalformedToken);
        }

        Ok(data.claims)
    }

    /// Verifies a token and returns its subject
    pub fn extract_subject(&self, token: &str, kind: TokenKind, allow_expired: bool) -> Result<String> {
        self.verify(token, kind, allow_expired).map(|claims| claims.sub)
    }
}

/// Extracts bearer token from an Authorization header value
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix(BEARER_PREFIX)
}
