//! # User Image Serving Handler
//!
//! Serves stored profile photos by image id. Image ids change whenever a
//! photo is replaced, so responses can be cached indefinitely.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderValue, header},
    response::IntoResponse,
};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::AppState,
    utils::constant::FALLBACK_CONTENT_TYPE,
};

/// Serves the bytes of a stored profile photo.
///
/// GET /resources/user-images/{image_id}
///
/// # Returns
///
/// - `200 OK` with the image bytes and their stored content type
/// - `400 Bad Request` - Image id is not a UUID (handled by Axum)
/// - `404 Not Found` - No image with that id
/// - `500 Internal Server Error` - Database error
#[instrument(skip_all, fields(%image_id, request_id = %uuid::Uuid::new_v4()))]
pub async fn serve_user_image(
    State(state): State<Arc<AppState>>,
    Path(image_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let image = state
        .image_store
        .find_image(image_id)
        .await?
        .ok_or_else(|| {
            debug!("Image not found");
            AppError::NotFound("Image not found")
        })?;

    let content_type = HeaderValue::from_str(&image.content_type).unwrap_or_else(|_| {
        warn!(content_type = %image.content_type, "Stored content type is not a valid header");
        HeaderValue::from_static(FALLBACK_CONTENT_TYPE)
    });

    debug!(size = image.blob.len(), "Serving user image");
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=31536000, immutable"),
            ),
            (
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
        ],
        image.blob,
    ))
}
