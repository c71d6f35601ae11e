//! Reading request cookies and building `Set-Cookie` values for the auth cookies

use std::convert::Infallible;
use warp::http::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use warp::reply::Response;
use warp::Filter;

use crate::constants::COOKIE_PATH;

/// Value of the named request cookie. `Cookie` headers that are not valid
/// UTF-8 are skipped.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Extracts an optional cookie; unreadable headers yield `None` instead of a rejection
pub fn optional_cookie(
    name: &'static str,
) -> impl Filter<Extract = (Option<String>,), Error = Infallible> + Clone {
    warp::header::headers_cloned().map(move |headers: HeaderMap| read_cookie(&headers, name))
}

/// An HTTP-only session cookie carrying `value`
pub fn auth_cookie(name: &str, value: &str, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly; Path={}; SameSite=Lax{}",
        name,
        value,
        COOKIE_PATH,
        if secure { "; Secure" } else { "" }
    )
}

/// Instructs the client to drop the cookie
pub fn cleared_cookie(name: &str, secure: bool) -> String {
    format!(
        "{}=; HttpOnly; Path={}; Max-Age=0; SameSite=Lax{}",
        name,
        COOKIE_PATH,
        if secure { "; Secure" } else { "" }
    )
}

/// Appends one `Set-Cookie` header per cookie
pub fn append_cookies(mut response: Response, cookies: &[String]) -> Response {
    for cookie in cookies {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => log::error!("Refusing to send malformed cookie header: {}", e),
        }
    }
    response
}
