//! Per-request authentication
//!
//! Turns an access token from the `access_token` cookie or the
//! `Authorization: Bearer` header into an [`Identity`]. Failure never rejects
//! the request here; route filters decide whether anonymity is acceptable.

use serde::Serialize;

use crate::auth::token::{extract_bearer_token, TokenKind, TokenManager};

/// The authenticated principal of one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: String,
    /// Always empty; role checks happen downstream
    pub authorities: Vec<String>,
}

impl Identity {
    pub fn new(username: String) -> Self {
        Self {
            username,
            authorities: Vec::new(),
        }
    }
}

/// Picks the request's bearer token. The header wins over the cookie.
pub fn select_token<'a>(
    cookie_token: Option<&'a str>,
    authorization_header: Option<&'a str>,
) -> Option<&'a str> {
    let mut token = cookie_token;
    if let Some(header_token) = authorization_header.and_then(extract_bearer_token) {
        token = Some(header_token);
    }
    token
}

/// Authenticates one request from its cookie and header
pub fn authenticate_request(
    tokens: &TokenManager,
    cookie_token: Option<&str>,
    authorization_header: Option<&str>,
) -> Option<Identity> {
    let token = select_token(cookie_token, authorization_header)?;

    match tokens.extract_subject(token, TokenKind::Access, false) {
        Ok(username) => Some(Identity::new(username)),
        Err(e) => {
            log::debug!("Request left anonymous: {}", e);
            None
        }
    }
}
