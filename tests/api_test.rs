use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::{HeaderValue, StatusCode};
use warp::hyper::body::Bytes;
use warp::{Filter, Reply};

use resto_auth::auth::AuthService;
use resto_auth::config::AuthConfig;
use resto_auth::handlers::{auth_routes, handle_rejection, AuthApi};
use resto_auth::storage::MemoryStorage;

fn routes(
    config: &AuthConfig,
) -> (
    Arc<MemoryStorage>,
    impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone + 'static,
) {
    let storage = Arc::new(MemoryStorage::new());
    let service = Arc::new(AuthService::new(config, storage.clone()).unwrap());
    let filter = auth_routes(AuthApi::new(service, config)).recover(handle_rejection);
    (storage, filter)
}

fn set_cookies(response: &warp::http::Response<Bytes>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// The `name=value` pair of the named Set-Cookie header
fn cookie_pair(response: &warp::http::Response<Bytes>, name: &str) -> String {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&format!("{}=", name)))
        .and_then(|c| c.split(';').next().map(str::to_string))
        .unwrap()
}

fn body(response: &warp::http::Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

fn alice() -> Value {
    json!({
        "username": "alice01",
        "password": "secret1",
        "confirmPassword": "secret1",
        "email": "alice01@gmail.com"
    })
}

async fn register_and_login<F>(filter: &F) -> warp::http::Response<Bytes>
where
    F: Filter + 'static,
    F::Extract: Reply + Send,
{
    let registered = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/register")
        .json(&alice())
        .reply(filter)
        .await;
    assert_eq!(registered.status(), StatusCode::CREATED);

    warp::test::request()
        .method("POST")
        .path("/api/v1/auth/login")
        .json(&json!({"username": "alice01", "password": "secret1"}))
        .reply(filter)
        .await
}

#[tokio::test]
async fn test_register_returns_created_user() {
    let (storage, filter) = routes(&AuthConfig::for_testing());

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/register")
        .json(&alice())
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let user = body(&response);
    assert_eq!(user["username"], "alice01");
    assert_eq!(user["role"], "OWNER");
    assert!(user.get("password_hash").is_none());
    assert_eq!(storage.restaurant_count().await, 1);
}

#[tokio::test]
async fn test_register_validation_and_conflict() {
    let (_, filter) = routes(&AuthConfig::for_testing());

    let mut yahoo = alice();
    yahoo["email"] = json!("alice01@yahoo.com");
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/register")
        .json(&yahoo)
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let problem = body(&response);
    assert_eq!(problem["detail"], "Only Gmail addresses are allowed");
    assert_eq!(
        problem["type"],
        "https://api.example.com/problems/validation-error"
    );

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let response = warp::test::request()
            .method("POST")
            .path("/api/v1/auth/register")
            .json(&alice())
            .reply(&filter)
            .await;
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn test_login_sets_http_only_cookies() {
    let (storage, filter) = routes(&AuthConfig::for_testing());
    let response = register_and_login(&filter).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    for cookie in &cookies {
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Secure"));
    }
    assert!(cookies.iter().any(|c| c.starts_with("access_token=")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));

    let token = body(&response);
    assert_eq!(token["token_type"], "Bearer");
    assert_eq!(storage.refresh_token_count().await, 1);
}

#[tokio::test]
async fn test_secure_cookies_flag() {
    let mut config = AuthConfig::for_testing();
    config.secure_cookies = true;
    let (_, filter) = routes(&config);

    let response = register_and_login(&filter).await;
    assert!(set_cookies(&response).iter().all(|c| c.contains("Secure")));
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let (_, filter) = routes(&AuthConfig::for_testing());
    register_and_login(&filter).await;

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/login")
        .json(&json!({"username": "alice01", "password": "wrong!!"}))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookies(&response).is_empty());
    let problem = body(&response);
    assert_eq!(
        problem["type"],
        "https://api.example.com/problems/invalid-credentials"
    );
    assert_eq!(problem["instance"], "/api/v1/auth/login");
}

#[tokio::test]
async fn test_me_requires_identity() {
    let (_, filter) = routes(&AuthConfig::for_testing());

    let anonymous = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/me")
        .reply(&filter)
        .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body(&anonymous)["type"],
        "https://api.example.com/problems/authentication-required"
    );

    let garbage = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/me")
        .header("cookie", "access_token=garbage")
        .reply(&filter)
        .await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_cookie_or_bearer_header() {
    let (_, filter) = routes(&AuthConfig::for_testing());
    let login = register_and_login(&filter).await;
    let access = cookie_pair(&login, "access_token");

    let by_cookie = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/me")
        .header("cookie", access.as_str())
        .reply(&filter)
        .await;
    assert_eq!(by_cookie.status(), StatusCode::OK);
    assert_eq!(body(&by_cookie)["username"], "alice01");

    let token = body(&login)["access_token"].as_str().unwrap().to_string();
    let by_header = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/me")
        .header("authorization", format!("Bearer {}", token))
        .reply(&filter)
        .await;
    assert_eq!(by_header.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_sets_new_access_cookie() {
    let (_, filter) = routes(&AuthConfig::for_testing());
    let login = register_and_login(&filter).await;
    let refresh = cookie_pair(&login, "refresh_token");

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/refresh")
        .header("cookie", refresh.as_str())
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("access_token="));

    let missing = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/refresh")
        .reply(&filter)
        .await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_cookies_and_revokes_session() {
    let (storage, filter) = routes(&AuthConfig::for_testing());
    let login = register_and_login(&filter).await;
    let refresh = cookie_pair(&login, "refresh_token");

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/logout")
        .header("cookie", refresh.as_str())
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    assert_eq!(storage.refresh_token_count().await, 0);

    let after = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/refresh")
        .header("cookie", refresh.as_str())
        .reply(&filter)
        .await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_cookie_still_clears() {
    let (_, filter) = routes(&AuthConfig::for_testing());

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/logout")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(set_cookies(&response).len(), 2);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (_, filter) = routes(&AuthConfig::for_testing());

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/login")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_utf8_credentials_are_anonymous() {
    let (_, filter) = routes(&AuthConfig::for_testing());

    let header = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/me")
        .header("authorization", HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap())
        .reply(&filter)
        .await;
    assert_eq!(header.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body(&header)["type"],
        "https://api.example.com/problems/authentication-required"
    );

    let cookie = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/me")
        .header("cookie", HeaderValue::from_bytes(b"access_token=\xff\xfe").unwrap())
        .reply(&filter)
        .await;
    assert_eq!(cookie.status(), StatusCode::UNAUTHORIZED);

    let refresh = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/refresh")
        .header("cookie", HeaderValue::from_bytes(b"refresh_token=\xff\xfe").unwrap())
        .reply(&filter)
        .await;
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_utf8_header_does_not_hide_valid_cookie() {
    let (_, filter) = routes(&AuthConfig::for_testing());
    let login = register_and_login(&filter).await;
    let access = cookie_pair(&login, "access_token");

    let response = warp::test::request()
        .method("GET")
        .path("/api/v1/auth/me")
        .header("cookie", access.as_str())
        .header("authorization", HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap())
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_content_type_is_unsupported() {
    let (_, filter) = routes(&AuthConfig::for_testing());

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/login")
        .header("content-type", "text/plain")
        .body(r#"{"username":"alice01","password":"secret1"}"#)
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        body(&response)["type"],
        "https://api.example.com/problems/unsupported-media-type"
    );
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let (storage, filter) = routes(&AuthConfig::for_testing());

    let mut huge = alice();
    huge["email"] = json!(format!("{}@gmail.com", "a".repeat(32 * 1024)));
    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/register")
        .json(&huge)
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(storage.user_count().await, 0);
}

#[tokio::test]
async fn test_body_without_length_is_rejected() {
    let (_, filter) = routes(&AuthConfig::for_testing());

    let response = warp::test::request()
        .method("POST")
        .path("/api/v1/auth/login")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::LENGTH_REQUIRED);
}
