//! # Bearer Authentication
//!
//! Guards the photo settings route: a request must carry a valid access
//! token, and the handlers receive the token's subject as [`AuthUser`].

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, trace, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::AppState;

/// The user a request was authenticated as.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Rejects the request with `401 Unauthorized` unless its bearer token
/// validates, then hands [`AuthUser`] to the handler through the extensions.
#[instrument(
    skip_all,
    fields(
        method = %req.method(),
        uri = %req.uri(),
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> AppResult<Response> {
    trace!("Authenticating request");

    let token = bearer_token(req.headers()).ok_or_else(|| {
        warn!("Missing or malformed bearer token");
        AppError::Unauthorized("Missing access token")
    })?;

    let claims = state
        .jwt_service
        .validate_access_token(token)
        .map_err(|e| {
            warn!(error = %e, "Access token rejected");
            AppError::Unauthorized("Invalid access token")
        })?;

    let user_id = Uuid::try_parse(&claims.sub).map_err(|e| {
        warn!(error = %e, "Access token subject is not a user id");
        AppError::Unauthorized("Invalid access token")
    })?;

    debug!(%user_id, "Request authenticated");
    req.extensions_mut().insert(AuthUser { user_id });
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
