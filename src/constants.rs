// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const API_PREFIX: &str = "api";
pub const API_VERSION: &str = "v1";

// Cookie and header names
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const AUTH_HEADER: &str = "authorization";
pub const BEARER_PREFIX: &str = "Bearer ";
pub const COOKIE_PATH: &str = "/";

// Largest accepted JSON request body (bytes)
pub const MAX_JSON_BODY_BYTES: u64 = 16 * 1024;

// Token lifetimes (seconds)
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_REFRESH_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

// Registration rules
pub const MIN_USERNAME_LENGTH: usize = 6;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const ALLOWED_EMAIL_DOMAIN: &str = "@gmail.com";
