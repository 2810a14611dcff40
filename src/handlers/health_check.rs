//! # Health Check Handler
//!
//! Liveness endpoint for load balancers and deployment tooling. It does not
//! touch the image store, so it stays green while the database is down.

use axum::http::StatusCode;
use tracing::{debug, instrument};

/// Returns `200 OK` with an empty body whenever the server accepts requests.
#[instrument]
pub async fn health_check() -> StatusCode {
    debug!("Health check requested");
    StatusCode::OK
}
