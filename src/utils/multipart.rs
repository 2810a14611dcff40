//! # Bounded Multipart Parsing
//!
//! Reads the photo form's multipart body while never buffering more than a
//! fixed number of bytes per part. A file part that grows past the bound is
//! drained and reported as oversized so that schema validation can turn it
//! into a field error instead of a transport failure.

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::utils::constant::{
    CSRF_FIELD, DELETE_CHECK_FIELD, INTENT_FIELD, MAX_TEXT_FIELD_SIZE, PHOTO_FILE_FIELD,
};

/// Errors that abort multipart parsing
#[derive(Debug, Error)]
pub enum MultipartReadError {
    #[error("request body exceeds the transport limit")]
    TooLarge,
    #[error("malformed multipart body: {0}")]
    Malformed(String),
    #[error("text field `{0}` is too long")]
    TextFieldTooLong(String),
}

impl From<MultipartError> for MultipartReadError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            MultipartReadError::TooLarge
        } else {
            MultipartReadError::Malformed(e.body_text())
        }
    }
}

/// A file part read with a size bound.
///
/// `size` counts every byte received; `bytes` is only kept while the part
/// stays within the bound and is empty for an oversized part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn is_oversized(&self) -> bool {
        self.size > self.bytes.len()
    }
}

/// Raw fields of a photo form submission, before schema validation.
#[derive(Debug, Clone, Default)]
pub struct PhotoFormData {
    pub intent: Option<String>,
    pub csrf: Option<String>,
    /// Delete confirmation state posted by the rendered page
    pub delete_check: Option<String>,
    pub photo_file: Option<UploadedFile>,
}

/// Parses the photo form, buffering at most `max_part_size` bytes of the file.
///
/// Unknown fields are drained and ignored. When a field appears twice, the
/// last occurrence wins.
pub async fn parse_photo_form(
    multipart: &mut Multipart,
    max_part_size: usize,
) -> Result<PhotoFormData, MultipartReadError> {
    let mut form = PhotoFormData::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            INTENT_FIELD => form.intent = Some(read_text(field, INTENT_FIELD).await?),
            CSRF_FIELD => form.csrf = Some(read_text(field, CSRF_FIELD).await?),
            DELETE_CHECK_FIELD => {
                form.delete_check = Some(read_text(field, DELETE_CHECK_FIELD).await?);
            }
            PHOTO_FILE_FIELD => form.photo_file = Some(read_file(field, max_part_size).await?),
            _ => {
                warn!(field_name = %field_name, "Unknown field in multipart form");
                drain(field).await?;
            }
        }
    }

    Ok(form)
}

async fn read_file(
    mut field: Field<'_>,
    max_part_size: usize,
) -> Result<UploadedFile, MultipartReadError> {
    let mut file = UploadedFile {
        file_name: field.file_name().map(str::to_string),
        content_type: field.content_type().map(str::to_string),
        ..UploadedFile::default()
    };

    while let Some(chunk) = field.chunk().await? {
        file.size += chunk.len();

        if file.size <= max_part_size {
            file.bytes.extend_from_slice(&chunk);
        } else if !file.bytes.is_empty() {
            debug!(max_part_size, "File part exceeded size bound, discarding buffer");
            file.bytes = Vec::new();
        }
    }

    trace!(size = file.size, oversized = file.is_oversized(), "File part read");
    Ok(file)
}

async fn read_text(mut field: Field<'_>, name: &str) -> Result<String, MultipartReadError> {
    let mut buffer = Vec::new();

    while let Some(chunk) = field.chunk().await? {
        if buffer.len() + chunk.len() > MAX_TEXT_FIELD_SIZE {
            warn!(field_name = %name, "Text field exceeds size bound");
            return Err(MultipartReadError::TextFieldTooLong(name.to_string()));
        }
        buffer.extend_from_slice(&chunk);
    }

    String::from_utf8(buffer)
        .map_err(|_| MultipartReadError::Malformed(format!("field `{name}` is not UTF-8")))
}

async fn drain(mut field: Field<'_>) -> Result<(), MultipartReadError> {
    while field.chunk().await?.is_some() {}
    Ok(())
}
