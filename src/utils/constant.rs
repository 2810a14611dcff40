//! # Application Constants
//!
//! This module defines configuration constants used throughout the photo settings
//! service. These constants control upload limits, token lifetimes and the
//! names shared between the server and the rendered form.

use std::time::Duration;

/// Maximum size of an uploaded profile photo (3 MiB)
///
/// Enforced both while parsing the multipart body and when validating the
/// submitted form.
pub const MAX_UPLOAD_SIZE: usize = 3 * 1024 * 1024;

/// Maximum size of a whole request body
///
/// Leaves room for an oversized photo part to be drained and reported as a
/// validation error instead of aborting the connection mid-stream.
pub const MAX_REQUEST_BODY_SIZE: usize = 4 * MAX_UPLOAD_SIZE;

/// Maximum size of a text field (intent, csrf) in the multipart form
pub const MAX_TEXT_FIELD_SIZE: usize = 1024;

/// Where the browser is sent after a successful save or delete
pub const PROFILE_SETTINGS_PATH: &str = "/settings/profile";

/// Route handled by the loader and the action
pub const PROFILE_PHOTO_PATH: &str = "/settings/profile/photo";

/// Prefix of the public user image resource route
pub const USER_IMAGES_PATH: &str = "/resources/user-images";

/// Multipart field carrying the submission intent
pub const INTENT_FIELD: &str = "intent";

/// Multipart field carrying the photo file
pub const PHOTO_FILE_FIELD: &str = "photoFile";

/// Multipart field the rendered page uses to carry its delete confirmation
pub const DELETE_CHECK_FIELD: &str = "deleteCheck";

/// `deleteCheck` value once the first delete press has been made
pub const DELETE_ARMED: &str = "armed";

/// `deleteCheck` value before any delete press
pub const DELETE_UNARMED: &str = "unarmed";

/// Multipart field and cookie carrying the anti-forgery token
pub const CSRF_FIELD: &str = "csrf";

/// Content type recorded when the browser does not declare one
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Expiration time for JWT access tokens
pub const ACCESS_TOKEN_EXPIRY: Duration = Duration::from_secs(15 * 60);

/// Number of random bytes in a CSRF token nonce
pub const CSRF_NONCE_LEN: usize = 32;

/// JPEG quality used when encoding a cropped photo, matching the browser
/// canvas default of 0.92
pub const CROP_JPEG_QUALITY: u8 = 92;

/// Largest canvas area a drawing surface will allocate (16384 x 16384)
pub const MAX_CANVAS_AREA: u64 = 16384 * 16384;

/// File name given to a cropped photo
pub const CROPPED_FILE_NAME: &str = "cropped.jpg";
