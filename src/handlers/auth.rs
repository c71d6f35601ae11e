//! Authentication API endpoints under `/api/v1/auth`

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use warp::http::{HeaderMap, StatusCode};
use warp::path::FullPath;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::auth::gate::Identity;
use crate::auth::registration::RegisterRequest;
use crate::auth::service::SharedAuthService;
use crate::config::AuthConfig;
use crate::constants::{
    ACCESS_TOKEN_COOKIE, API_PREFIX, API_VERSION, AUTH_HEADER, MAX_JSON_BODY_BYTES,
    REFRESH_TOKEN_COOKIE,
};
use crate::error::RestoAuthError;
use crate::handlers::cookies::{
    append_cookies, auth_cookie, cleared_cookie, optional_cookie, read_cookie,
};
use crate::handlers::problem::{problem_response, ApiError};

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Access token response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// State shared by the auth routes
#[derive(Clone)]
pub struct AuthApi {
    service: SharedAuthService,
    secure_cookies: bool,
    access_ttl_secs: i64,
}

impl AuthApi {
    pub fn new(service: SharedAuthService, config: &AuthConfig) -> Self {
        Self {
            service,
            secure_cookies: config.secure_cookies,
            access_ttl_secs: config.access_token_ttl.num_seconds(),
        }
    }

    fn token_response(&self, access_token: &str) -> Response {
        let body = TokenResponse {
            access_token: access_token.to_string(),
            token_type: "Bearer",
            expires_in: self.access_ttl_secs,
        };
        warp::reply::json(&body).into_response()
    }
}

fn reject(error: RestoAuthError, path: &FullPath) -> Rejection {
    warp::reject::custom(ApiError::new(error, path.as_str()))
}

fn with_api(api: AuthApi) -> impl Filter<Extract = (AuthApi,), Error = Infallible> + Clone {
    warp::any().map(move || api.clone())
}

/// Resolves the request's identity; never rejects. Header values that are
/// not valid UTF-8 count as absent.
pub fn with_identity(
    service: SharedAuthService,
) -> impl Filter<Extract = (Option<Identity>,), Error = Infallible> + Clone {
    warp::header::headers_cloned().map(move |headers: HeaderMap| {
        let cookie = read_cookie(&headers, ACCESS_TOKEN_COOKIE);
        let authorization = headers.get(AUTH_HEADER).and_then(|v| v.to_str().ok());
        service.authenticate_request(cookie.as_deref(), authorization)
    })
}

/// Like [`with_identity`] but rejects anonymous requests with 401
pub fn require_identity(
    service: SharedAuthService,
) -> impl Filter<Extract = (Identity,), Error = Rejection> + Clone {
    with_identity(service)
        .and(warp::path::full())
        .and_then(|identity: Option<Identity>, path: FullPath| async move {
            identity.ok_or_else(|| reject(RestoAuthError::Unauthenticated, &path))
        })
}

pub async fn handle_login(
    path: FullPath,
    request: LoginRequest,
    api: AuthApi,
) -> Result<Response, Rejection> {
    let tokens = api
        .service
        .login(&request.username, &request.password)
        .await
        .map_err(|e| reject(e, &path))?;

    Ok(append_cookies(
        api.token_response(&tokens.access_token),
        &[
            auth_cookie(ACCESS_TOKEN_COOKIE, &tokens.access_token, api.secure_cookies),
            auth_cookie(REFRESH_TOKEN_COOKIE, &tokens.refresh_token, api.secure_cookies),
        ],
    ))
}

pub async fn handle_register(
    path: FullPath,
    request: RegisterRequest,
    api: AuthApi,
) -> Result<Response, Rejection> {
    let user = api
        .service
        .register(request)
        .await
        .map_err(|e| reject(e, &path))?;

    Ok(warp::reply::with_status(warp::reply::json(&user), StatusCode::CREATED).into_response())
}

pub async fn handle_refresh(
    path: FullPath,
    refresh_token: Option<String>,
    api: AuthApi,
) -> Result<Response, Rejection> {
    let access_token = api
        .service
        .refresh_access_token(refresh_token.as_deref())
        .await
        .map_err(|e| reject(e, &path))?;

    Ok(append_cookies(
        api.token_response(&access_token),
        &[auth_cookie(ACCESS_TOKEN_COOKIE, &access_token, api.secure_cookies)],
    ))
}

/// Always clears both cookies, even when revocation fails
pub async fn handle_logout(
    path: FullPath,
    refresh_token: Option<String>,
    api: AuthApi,
) -> Result<Response, Infallible> {
    let response = match api.service.logout(refresh_token.as_deref()).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => problem_response(&e, path.as_str()),
    };

    Ok(append_cookies(
        response,
        &[
            cleared_cookie(ACCESS_TOKEN_COOKIE, api.secure_cookies),
            cleared_cookie(REFRESH_TOKEN_COOKIE, api.secure_cookies),
        ],
    ))
}

pub async fn handle_me(identity: Identity) -> Result<Response, Rejection> {
    Ok(warp::reply::json(&identity).into_response())
}

/// Create the authentication API routes
pub fn auth_routes(
    api: AuthApi,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let base = warp::path(API_PREFIX)
        .and(warp::path(API_VERSION))
        .and(warp::path("auth"));

    let login = base
        .clone()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::path::full())
        .and(warp::body::content_length_limit(MAX_JSON_BODY_BYTES))
        .and(warp::body::json())
        .and(with_api(api.clone()))
        .and_then(handle_login);

    let register = base
        .clone()
        .and(warp::path("register"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::path::full())
        .and(warp::body::content_length_limit(MAX_JSON_BODY_BYTES))
        .and(warp::body::json())
        .and(with_api(api.clone()))
        .and_then(handle_register);

    let refresh = base
        .clone()
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::path::full())
        .and(optional_cookie(REFRESH_TOKEN_COOKIE))
        .and(with_api(api.clone()))
        .and_then(handle_refresh);

    let logout = base
        .clone()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::path::full())
        .and(optional_cookie(REFRESH_TOKEN_COOKIE))
        .and(with_api(api.clone()))
        .and_then(handle_logout);

    let me = base
        .clone()
        .and(warp::path("me"))
        .and(warp::path::end())
        .and(warp::get())
        .and(require_identity(api.service.clone()))
        .and_then(handle_me);

    login
        .or(register)
        .unify()
        .or(refresh)
        .unify()
        .or(logout)
        .unify()
        .or(me)
        .unify()
}
