//! # Photo Settings - Profile Photo Service
//!
//! ## Modules
//!
//! - [`handlers`] - HTTP request handlers for the photo settings route
//! - [`middleware`] - Authentication middleware for protected routes
//! - [`models`] - Domain types, form validation and shared state
//! - [`services`] - Image storage, JWT and anti-forgery services
//! - [`view`] - Photo form state machine, crop helper and page rendering
//! - [`utils`] - Utility functions and constants

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;
pub mod view;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::get,
};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ConfigError;
use crate::handlers::{get_profile_photo, health_check, serve_user_image, update_profile_photo};
use crate::middleware::auth_middleware;
use crate::models::AppState;
use crate::services::{csrf::CsrfService, image_store::PgImageStore, jwt::JwtService};
use crate::utils::{constant::*, secret::get_secret, static_object::APP_ENV};

/// Creates an Axum router backed by PostgreSQL.
///
/// # Environment Variables
///
/// - `JWT_SECRET` / `JWT_SECRET_FILE` - Required for access token validation
/// - `CSRF_SECRET` / `CSRF_SECRET_FILE` - Required for signing anti-forgery tokens
///
/// # Errors
///
/// Returns [`ConfigError`] when a required secret is missing or unusable.
pub fn app(db_pool: PgPool) -> Result<Router, ConfigError> {
    info!(app_env = %*APP_ENV, "Assembling application");

    let jwt_secret = get_secret("JWT_SECRET_FILE", "JWT_SECRET")
        .ok_or(ConfigError::MissingSecret("JWT_SECRET"))?;
    let csrf_secret = get_secret("CSRF_SECRET_FILE", "CSRF_SECRET")
        .ok_or(ConfigError::MissingSecret("CSRF_SECRET"))?;

    let jwt_service = JwtService::from_secret(jwt_secret.expose_secret().as_bytes());
    let csrf_service = CsrfService::new(csrf_secret.expose_secret().as_bytes())?;

    let state = Arc::new(AppState::new(
        Arc::new(PgImageStore::new(db_pool)),
        jwt_service,
        csrf_service,
    ));

    Ok(app_with_state(state))
}

/// Creates an Axum router with application routes around an existing state.
///
/// Tests use this to run the service over an in-memory image store.
pub fn app_with_state(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route(
            PROFILE_PHOTO_PATH,
            get(get_profile_photo).post(update_profile_photo),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_SIZE))
        .route_layer(from_fn_with_state(Arc::clone(&state), auth_middleware));

    let public_routes = Router::new()
        .route("/health-check", get(health_check))
        .route(
            &format!("{USER_IMAGES_PATH}/{{image_id}}"),
            get(serve_user_image),
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
