//! Liveness endpoint backed by the storage health check

use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::error::Result;
use crate::storage::StorageProvider;

fn health_response(status: Result<bool>) -> Response {
    match status {
        Ok(true) => "OK".into_response(),
        Ok(false) => {
            log::warn!("Storage backend reported unhealthy");
            warp::reply::with_status("UNAVAILABLE", StatusCode::SERVICE_UNAVAILABLE).into_response()
        }
        Err(e) => {
            log::error!("Storage health check failed: {}", e);
            warp::reply::with_status("UNAVAILABLE", StatusCode::SERVICE_UNAVAILABLE).into_response()
        }
    }
}

/// `GET /health`
pub fn health_route(
    storage: Arc<dyn StorageProvider>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(move || {
            let storage = storage.clone();
            async move { Ok::<_, Rejection>(health_response(storage.health_check().await)) }
        })
}
