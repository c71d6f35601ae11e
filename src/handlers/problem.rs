//! Problem-detail rendering for API errors

use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

use crate::error::RestoAuthError;

const PROBLEM_BASE: &str = "https://api.example.com/problems";

/// A core error bound to the request path it occurred on
#[derive(Debug)]
pub struct ApiError {
    pub error: RestoAuthError,
    pub instance: String,
}

impl ApiError {
    pub fn new(error: RestoAuthError, instance: &str) -> Self {
        Self {
            error,
            instance: instance.to_string(),
        }
    }
}

impl warp::reject::Reject for ApiError {}

/// JSON error payload
#[derive(Debug, Serialize)]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: &'static str,
    pub status: u16,
    pub detail: String,
    pub instance: String,
}

fn title_for(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Duplicate resource",
        411 => "Length Required",
        413 => "Payload Too Large",
        415 => "Unsupported Media Type",
        _ => "Internal Server Error",
    }
}

fn render(status: u16, category: &str, detail: String, instance: &str) -> Response {
    let body = ProblemDetail {
        problem_type: format!("{}/{}", PROBLEM_BASE, category),
        title: title_for(status),
        status,
        detail,
        instance: instance.to_string(),
    };
    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    warp::reply::with_status(warp::reply::json(&body), code).into_response()
}

/// Renders a core error. Internal details and token failure reasons stay server-side.
pub fn problem_response(error: &RestoAuthError, instance: &str) -> Response {
    let status = error.status();
    let detail = if error.is_token_error() {
        RestoAuthError::Unauthenticated.to_string()
    } else if status >= 500 {
        log::error!("Request to {} failed: {}", instance, error);
        "An unexpected error occurred".to_string()
    } else {
        error.to_string()
    };
    render(status, error.category(), detail, instance)
}

/// Recover filter for every route
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if let Some(api_error) = err.find::<ApiError>() {
        return Ok(problem_response(&api_error.error, &api_error.instance));
    }

    if err.is_not_found() {
        return Ok(render(
            404,
            "not-found",
            "The requested resource was not found".to_string(),
            "",
        ));
    }

    if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(render(400, "validation-error", e.to_string(), ""));
    }

    if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        return Ok(render(
            415,
            "unsupported-media-type",
            "Request body must be application/json".to_string(),
            "",
        ));
    }

    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(render(
            413,
            "payload-too-large",
            "The request payload is too large".to_string(),
            "",
        ));
    }

    if err.find::<warp::reject::LengthRequired>().is_some() {
        return Ok(render(
            411,
            "length-required",
            "A content-length header is required".to_string(),
            "",
        ));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(render(
            405,
            "method-not-allowed",
            "Method not allowed".to_string(),
            "",
        ));
    }

    log::error!("Unhandled rejection: {:?}", err);
    Ok(render(
        500,
        "internal-server-error",
        "An unexpected error occurred".to_string(),
        "",
    ))
}
