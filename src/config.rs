//! Service configuration module
//! Loads token lifetimes, the signing secret and hashing cost from the environment

use crate::constants::{
    DEFAULT_ACCESS_TOKEN_TTL_SECS, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_REFRESH_SESSION_TTL_SECS,
    DEFAULT_REFRESH_TOKEN_TTL_SECS,
};
use crate::error::{RestoAuthError, Result};
use chrono::Duration;
use std::env;

/// Argon2 cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Authentication service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub host: String,
    pub port: u16,
    /// Shared HMAC secret for signing access and refresh tokens
    pub jwt_secret: String,
    /// Lifetime embedded in access tokens
    pub access_token_ttl: Duration,
    /// Lifetime embedded in refresh tokens
    pub refresh_token_ttl: Duration,
    /// How long a stored refresh session stays valid
    pub refresh_session_ttl: Duration,
    /// Add the `Secure` attribute to auth cookies
    pub secure_cookies: bool,
    pub password_hash: PasswordHashConfig,
}

impl AuthConfig {
    /// Create a test configuration - DANGEROUS: Only for testing!
    ///
    /// Uses a fixed secret and the cheapest Argon2 parameters so test suites stay fast.
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            jwt_secret: "test-jwt-key-only-for-unit-tests-never-use-in-production-42".to_string(),
            access_token_ttl: Duration::seconds(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            refresh_token_ttl: Duration::seconds(DEFAULT_REFRESH_TOKEN_TTL_SECS),
            refresh_session_ttl: Duration::seconds(DEFAULT_REFRESH_SESSION_TTL_SECS),
            secure_cookies: false,
            password_hash: PasswordHashConfig {
                memory_kib: 8,
                iterations: 1,
                parallelism: 1,
            },
        }
    }

    /// Validate that the signing secret meets security requirements
    fn validate_jwt_secret(secret: &str) -> Result<()> {
        if secret.len() < 32 {
            return Err(RestoAuthError::ConfigError(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        // Check for insecure default or example values
        let insecure_patterns = [
            "your-secret-key",
            "change-this",
            "test-secret",
            "default",
            "secret",
            "password",
            "12345",
        ];

        for pattern in &insecure_patterns {
            if secret.contains(pattern) {
                return Err(RestoAuthError::ConfigError(format!(
                    "JWT secret contains insecure pattern '{}'. Please use a secure random secret generated with: openssl rand -base64 32",
                    pattern
                )));
            }
        }

        if secret.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RestoAuthError::ConfigError(
                "JWT secret should contain mixed characters (letters, numbers, symbols) for security"
                    .to_string(),
            ));
        }

        Ok(())
    }

    fn parse_ttl(name: &str, raw: Option<String>, default_secs: i64) -> Result<Duration> {
        let secs = match raw {
            Some(value) => value.trim().parse::<i64>().map_err(|_| {
                RestoAuthError::ConfigError(format!("{} must be a whole number of seconds", name))
            })?,
            None => default_secs,
        };
        if secs <= 0 {
            return Err(RestoAuthError::ConfigError(format!("{} must be positive", name)));
        }
        Ok(Duration::seconds(secs))
    }

    fn parse_flag(raw: Option<String>) -> bool {
        raw.map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("RESTO_AUTH_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup("RESTO_AUTH_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let jwt_secret = lookup("RESTO_AUTH_JWT_SECRET")
            .or_else(|| lookup("JWT_SECRET"))
            .ok_or_else(|| {
                RestoAuthError::ConfigError(
                    "JWT_SECRET environment variable is required for security. \
                     Generate one with: openssl rand -base64 32"
                        .to_string(),
                )
            })?;
        Self::validate_jwt_secret(&jwt_secret)?;

        let access_token_ttl = Self::parse_ttl(
            "RESTO_AUTH_ACCESS_TOKEN_TTL_SECS",
            lookup("RESTO_AUTH_ACCESS_TOKEN_TTL_SECS"),
            DEFAULT_ACCESS_TOKEN_TTL_SECS,
        )?;
        let refresh_token_ttl = Self::parse_ttl(
            "RESTO_AUTH_REFRESH_TOKEN_TTL_SECS",
            lookup("RESTO_AUTH_REFRESH_TOKEN_TTL_SECS"),
            DEFAULT_REFRESH_TOKEN_TTL_SECS,
        )?;
        let refresh_session_ttl = Self::parse_ttl(
            "RESTO_AUTH_REFRESH_SESSION_TTL_SECS",
            lookup("RESTO_AUTH_REFRESH_SESSION_TTL_SECS"),
            DEFAULT_REFRESH_SESSION_TTL_SECS,
        )?;

        let secure_cookies = Self::parse_flag(lookup("RESTO_AUTH_SECURE_COOKIES"));

        let defaults = PasswordHashConfig::default();
        let password_hash = PasswordHashConfig {
            memory_kib: lookup("RESTO_AUTH_ARGON2_MEMORY_KIB")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.memory_kib),
            iterations: lookup("RESTO_AUTH_ARGON2_ITERATIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.iterations),
            parallelism: lookup("RESTO_AUTH_ARGON2_PARALLELISM")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.parallelism),
        };

        Ok(Self {
            host,
            port,
            jwt_secret,
            access_token_ttl,
            refresh_token_ttl,
            refresh_session_ttl,
            secure_cookies,
            password_hash,
        })
    }
}
