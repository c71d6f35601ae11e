use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoAuthError {
    // Credential errors
    InvalidCredentials,

    // Registration errors
    ValidationError(String),
    DuplicateResource(String),

    // Token errors
    Unauthenticated,
    MalformedToken,
    ExpiredToken,

    // Storage errors
    StorageError(String),

    // Password hashing errors
    PasswordHash(String),

    // System errors
    SystemError(String),

    // Configuration errors
    ConfigError(String),
}

impl RestoAuthError {
    /// Stable, machine-readable category for API payloads
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid-credentials",
            Self::ValidationError(_) => "validation-error",
            Self::DuplicateResource(_) => "duplicate-resource",
            Self::Unauthenticated | Self::MalformedToken | Self::ExpiredToken => {
                "authentication-required"
            }
            Self::StorageError(_)
            | Self::PasswordHash(_)
            | Self::SystemError(_)
            | Self::ConfigError(_) => "internal-server-error",
        }
    }

    /// HTTP status code the boundary layer renders this error with
    pub fn status(&self) -> u16 {
        match self {
            Self::ValidationError(_) => 400,
            Self::InvalidCredentials
            | Self::Unauthenticated
            | Self::MalformedToken
            | Self::ExpiredToken => 401,
            Self::DuplicateResource(_) => 409,
            Self::StorageError(_)
            | Self::PasswordHash(_)
            | Self::SystemError(_)
            | Self::ConfigError(_) => 500,
        }
    }

    /// Token codec failures, which callers fold into `Unauthenticated`
    pub fn is_token_error(&self) -> bool {
        matches!(self, Self::MalformedToken | Self::ExpiredToken)
    }
}

impl fmt::Display for RestoAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "Invalid username or password"),
            Self::ValidationError(msg) => write!(f, "{}", msg),
            Self::DuplicateResource(msg) => write!(f, "{}", msg),
            Self::Unauthenticated => write!(f, "Authentication is required"),
            Self::MalformedToken => write!(f, "Malformed or invalid token"),
            Self::ExpiredToken => write!(f, "Token expired"),
            Self::StorageError(msg) => write!(f, "Storage error: {}", msg),
            Self::PasswordHash(msg) => write!(f, "Password hashing error: {}", msg),
            Self::SystemError(msg) => write!(f, "System error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for RestoAuthError {}

impl From<argon2::password_hash::Error> for RestoAuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        RestoAuthError::PasswordHash(err.to_string())
    }
}

impl From<tokio::task::JoinError> for RestoAuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        RestoAuthError::SystemError(format!("Blocking task failed: {}", err))
    }
}

// Generic result type for resto-auth
pub type Result<T> = std::result::Result<T, RestoAuthError>;
