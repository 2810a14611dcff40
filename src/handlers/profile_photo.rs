//! # Profile Photo Handlers
//!
//! This module implements the loader and the action of the photo settings
//! route. The loader reports the current user and their photo reference;
//! the action accepts the multipart form that deletes or replaces the photo.
//!
//! # Mutations
//!
//! Each accepted submission performs exactly one store call as its last step.
//! Replacing a photo is atomic: the old image is removed and the new one
//! created in a single transaction.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Multipart, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::AuthUser,
    models::{ActionResponse, AppState, PhotoAction, ProfilePhotoUser, SubmissionStatus},
    services::csrf::CsrfService,
    utils::{
        constant::{DELETE_ARMED, MAX_UPLOAD_SIZE, PROFILE_SETTINGS_PATH},
        multipart::{MultipartReadError, parse_photo_form},
        static_object::SECURE_COOKIES,
    },
    view::{PhotoForm, render_photo_page},
};

/// Response containing the data the photo settings page needs
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfilePhotoResponse {
    pub user: ProfilePhotoUser,
}

/// Gets the authenticated user's identity and photo reference.
///
/// GET /settings/profile/photo
///
/// Browsers asking for `text/html` receive the rendered settings page along
/// with a fresh anti-forgery cookie; other clients receive JSON.
///
/// # Returns
///
/// - `200 OK` with [`ProfilePhotoResponse`] or the HTML page
/// - `401 Unauthorized` - Missing or invalid authentication token
/// - `404 Not Found` - User not found
/// - `500 Internal Server Error` - Database error
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn get_profile_photo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    headers: HeaderMap,
) -> AppResult<Response> {
    debug!("Processing profile photo request");

    let profile = load_profile(&state, user.user_id).await?;

    if wants_html(&headers) {
        let token = state.csrf_service.issue();
        let page = render_photo_page(&profile, &PhotoForm::new(&profile), &token);

        debug!("Rendered profile photo page");
        let jar = jar.add(CsrfService::cookie(token, *SECURE_COOKIES));
        return Ok((jar, page).into_response());
    }

    info!(has_image = profile.image.is_some(), "Profile photo data retrieved");
    Ok((StatusCode::OK, Json(ProfilePhotoResponse { user: profile })).into_response())
}

/// Deletes or replaces the authenticated user's profile photo.
///
/// POST /settings/profile/photo MultipartForm
///
/// Fields: `intent` (`delete`, `submit` or `validate`), `photoFile` (required
/// for `submit`), `csrf`, and `deleteCheck` as posted by the rendered page.
///
/// A delete posted with `deleteCheck` other than `armed` only arms the
/// confirmation and re-renders the page; the next press deletes. Requests
/// without `deleteCheck` delete immediately. Failed or `validate`
/// submissions are re-rendered as the page when the client accepts HTML.
///
/// # Returns
///
/// - `303 See Other` to `/settings/profile` - Photo deleted or saved
/// - `200 OK` with [`ActionResponse`] or the page - `validate` re-render or
///   armed delete, nothing saved
/// - `400 Bad Request` with [`ActionResponse`] or the page - Validation failed
/// - `400 Bad Request` - Malformed multipart body
/// - `401 Unauthorized` - Missing or invalid authentication token
/// - `403 Forbidden` - Missing or invalid anti-forgery token
/// - `404 Not Found` - User not found
/// - `413 Payload Too Large` - Request body exceeds the transport limit
/// - `500 Internal Server Error` - Database error
#[instrument(
    skip_all,
    fields(
        user_id = %user.user_id,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn update_profile_photo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<Response> {
    debug!("Processing profile photo submission");

    let form = parse_photo_form(&mut multipart, MAX_UPLOAD_SIZE)
        .await
        .map_err(|e| {
            warn!(error = %e, "Error reading multipart form");
            match e {
                MultipartReadError::TooLarge => AppError::PayloadTooLarge,
                _ => AppError::BadRequest("Invalid multipart data"),
            }
        })?;

    state
        .csrf_service
        .validate(&jar, form.csrf.as_deref())
        .map_err(|e| {
            warn!(error = %e, "Anti-forgery check failed");
            AppError::Forbidden("Invalid CSRF token")
        })?;

    // Validated against the cookie above, so it is safe to embed again.
    let csrf_token = form.csrf.clone().unwrap_or_default();
    let delete_check = form.delete_check.clone();

    let action = match form.into_action() {
        Ok(action) => action,
        Err(result) => {
            let status = if result.status == SubmissionStatus::Error {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::OK
            };
            debug!(%status, "Replying with submission result");

            if wants_html(&headers) {
                let profile = load_profile(&state, user.user_id).await?;
                let form = PhotoForm::new(&profile).with_result(result);
                let page = render_photo_page(&profile, &form, &csrf_token);
                return Ok((status, page).into_response());
            }
            return Ok((status, Json(ActionResponse { result })).into_response());
        }
    };

    match action {
        PhotoAction::Delete => {
            if let Some(check) = delete_check {
                let profile = load_profile(&state, user.user_id).await?;
                let mut page_form =
                    PhotoForm::new(&profile).with_delete_armed(check == DELETE_ARMED);

                if page_form.press_delete().is_none() {
                    debug!(armed = page_form.delete_armed(), "Delete not confirmed yet");
                    let page = render_photo_page(&profile, &page_form, &csrf_token);
                    return Ok((StatusCode::OK, page).into_response());
                }
            }

            let removed = state.image_store.delete_user_image(user.user_id).await?;
            info!(removed, "Profile photo deleted");
        }
        PhotoAction::Submit(image) => {
            let size = image.blob.len();
            let image_id = state
                .image_store
                .replace_user_image(user.user_id, image)
                .await?;
            info!(%image_id, size, "Profile photo saved");
        }
    }

    Ok(Redirect::to(PROFILE_SETTINGS_PATH).into_response())
}

async fn load_profile(state: &AppState, user_id: Uuid) -> AppResult<ProfilePhotoUser> {
    state.image_store.find_user(user_id).await?.ok_or_else(|| {
        warn!("User not found in store");
        AppError::NotFound("User not found")
    })
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|accept| accept.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}
