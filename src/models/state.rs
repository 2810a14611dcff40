use std::sync::Arc;

use tracing::info;

use crate::services::{csrf::CsrfService, image_store::ImageStore, jwt::JwtService};

/// Application state shared across requests. Needs to be thread-safe.
pub struct AppState {
    /// Persistence for users' profile photos.
    pub image_store: Arc<dyn ImageStore>,
    /// JWT service for validating the requesting user's access token.
    pub jwt_service: JwtService,
    /// Anti-forgery token issuance and validation.
    pub csrf_service: CsrfService,
}

impl AppState {
    /// Creates a new application state with the provided services.
    ///
    /// # Arguments
    ///
    /// * `image_store` - Backend holding users and their photos
    /// * `jwt_service` - Service for access token validation
    /// * `csrf_service` - Service for anti-forgery tokens
    pub fn new(
        image_store: Arc<dyn ImageStore>,
        jwt_service: JwtService,
        csrf_service: CsrfService,
    ) -> Self {
        info!("Initializing application state");

        Self {
            image_store,
            jwt_service,
            csrf_service,
        }
    }
}
