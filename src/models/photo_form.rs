//! # Photo Form Schema
//!
//! Validation of a parsed photo form against the discriminated schema:
//! a `delete` submission needs only its intent, while `submit` (and the
//! non-persisting `validate` re-render) need a non-empty photo file no
//! larger than [`MAX_UPLOAD_SIZE`].

use std::borrow::Cow;
use std::collections::BTreeMap;

use tracing::{debug, warn};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{Intent, NewUserImage, SubmissionResult, SubmissionStatus};
use crate::utils::constant::{
    FALLBACK_CONTENT_TYPE, INTENT_FIELD, MAX_UPLOAD_SIZE, PHOTO_FILE_FIELD,
};
use crate::utils::multipart::{PhotoFormData, UploadedFile};

pub const IMAGE_REQUIRED_MESSAGE: &str = "Image is required";
pub const IMAGE_TOO_LARGE_MESSAGE: &str = "Image size must be less than 3MB";
pub const INVALID_INTENT_MESSAGE: &str = "Invalid intent";

/// Fields of the `submit` variant.
#[derive(Debug, Validate)]
struct SubmitPhoto {
    #[validate(custom(function = "validate_photo_file"))]
    photo_file: UploadedFile,
}

fn validate_photo_file(file: &UploadedFile) -> Result<(), ValidationError> {
    if file.size == 0 {
        return Err(
            ValidationError::new("required").with_message(Cow::Borrowed(IMAGE_REQUIRED_MESSAGE))
        );
    }
    if file.size > MAX_UPLOAD_SIZE {
        return Err(
            ValidationError::new("too_large").with_message(Cow::Borrowed(IMAGE_TOO_LARGE_MESSAGE))
        );
    }
    Ok(())
}

/// A submission that passed validation and should be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoAction {
    Delete,
    Submit(NewUserImage),
}

impl PhotoFormData {
    /// Validates the form and decides what the action should do.
    ///
    /// `Ok` carries a mutation to perform. `Err` carries the result to send
    /// back without touching persisted state: either validation errors
    /// (`status: error`) or a `validate` re-render (`status: idle`).
    pub fn into_action(self) -> Result<PhotoAction, SubmissionResult> {
        let Some(intent) = self.intent.as_deref().and_then(Intent::parse) else {
            warn!(intent = ?self.intent, "Missing or unknown intent");
            let field_errors = BTreeMap::from([(
                INTENT_FIELD.to_string(),
                vec![INVALID_INTENT_MESSAGE.to_string()],
            )]);
            return Err(error_result(None, field_errors));
        };

        if intent == Intent::Delete {
            return Ok(PhotoAction::Delete);
        }

        let submit = SubmitPhoto {
            photo_file: self.photo_file.unwrap_or_default(),
        };
        let field_errors = match submit.validate() {
            Ok(()) => BTreeMap::new(),
            Err(errors) => form_field_errors(&errors),
        };
        let photo_file = submit.photo_file;

        match intent {
            Intent::Validate => {
                debug!(error_count = field_errors.len(), "Validate-only submission");
                Err(SubmissionResult {
                    status: SubmissionStatus::Idle,
                    intent: Some(intent),
                    field_errors,
                    form_errors: Vec::new(),
                })
            }
            _ if !field_errors.is_empty() => {
                warn!(size = photo_file.size, "Photo file failed validation");
                Err(error_result(Some(intent), field_errors))
            }
            _ => {
                let content_type = photo_file
                    .content_type
                    .filter(|content_type| !content_type.is_empty())
                    .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

                Ok(PhotoAction::Submit(NewUserImage {
                    content_type,
                    blob: photo_file.bytes,
                }))
            }
        }
    }
}

fn error_result(
    intent: Option<Intent>,
    field_errors: BTreeMap<String, Vec<String>>,
) -> SubmissionResult {
    SubmissionResult {
        status: SubmissionStatus::Error,
        intent,
        field_errors,
        form_errors: Vec::new(),
    }
}

/// Re-keys validator errors by the multipart field names the page uses.
fn form_field_errors(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let name = match field.as_ref() {
                "photo_file" => PHOTO_FILE_FIELD.to_string(),
                other => other.to_string(),
            };
            let messages = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map_or_else(|| error.code.to_string(), |message| message.to_string())
                })
                .collect();
            (name, messages)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(intent: &str, size: usize) -> PhotoFormData {
        PhotoFormData {
            intent: Some(intent.to_string()),
            csrf: None,
            delete_check: None,
            photo_file: Some(UploadedFile {
                file_name: Some("me.png".to_string()),
                content_type: Some("image/png".to_string()),
                size,
                bytes: vec![7; size.min(MAX_UPLOAD_SIZE)],
            }),
        }
    }

    #[test]
    fn submit_accepts_sizes_within_bounds() {
        for size in [1, 1024, MAX_UPLOAD_SIZE] {
            let action = form("submit", size).into_action().unwrap();
            let PhotoAction::Submit(image) = action else {
                panic!("expected submit action");
            };
            assert_eq!(image.blob.len(), size);
            assert_eq!(image.content_type, "image/png");
        }
    }

    #[test]
    fn submit_rejects_empty_file() {
        let result = form("submit", 0).into_action().unwrap_err();

        assert_eq!(result.status, SubmissionStatus::Error);
        assert_eq!(result.intent, Some(Intent::Submit));
        assert_eq!(result.errors_for(PHOTO_FILE_FIELD), [IMAGE_REQUIRED_MESSAGE]);
    }

    #[test]
    fn submit_rejects_oversized_file() {
        let result = form("submit", MAX_UPLOAD_SIZE + 1).into_action().unwrap_err();

        assert_eq!(result.status, SubmissionStatus::Error);
        assert_eq!(result.errors_for(PHOTO_FILE_FIELD), [IMAGE_TOO_LARGE_MESSAGE]);
    }

    #[test]
    fn submit_without_file_part_is_required_error() {
        let data = PhotoFormData {
            intent: Some("submit".to_string()),
            ..PhotoFormData::default()
        };
        let result = data.into_action().unwrap_err();

        assert_eq!(result.errors_for(PHOTO_FILE_FIELD), [IMAGE_REQUIRED_MESSAGE]);
    }

    #[test]
    fn delete_needs_only_the_intent() {
        let data = PhotoFormData {
            intent: Some("delete".to_string()),
            ..PhotoFormData::default()
        };
        assert_eq!(data.into_action(), Ok(PhotoAction::Delete));
    }

    #[test]
    fn unknown_intent_is_a_field_error() {
        let result = form("upload", 10).into_action().unwrap_err();

        assert_eq!(result.status, SubmissionStatus::Error);
        assert_eq!(result.intent, None);
        assert_eq!(result.errors_for(INTENT_FIELD), [INVALID_INTENT_MESSAGE]);
    }

    #[test]
    fn validate_intent_never_yields_a_mutation() {
        let ok = form("validate", 10).into_action().unwrap_err();
        assert_eq!(ok.status, SubmissionStatus::Idle);
        assert!(!ok.has_errors());

        let bad = form("validate", 0).into_action().unwrap_err();
        assert_eq!(bad.status, SubmissionStatus::Idle);
        assert_eq!(bad.errors_for(PHOTO_FILE_FIELD), [IMAGE_REQUIRED_MESSAGE]);
    }

    #[test]
    fn missing_content_type_falls_back_to_octet_stream() {
        let mut data = form("submit", 4);
        if let Some(file) = data.photo_file.as_mut() {
            file.content_type = None;
        }
        let Ok(PhotoAction::Submit(image)) = data.into_action() else {
            panic!("expected submit action");
        };
        assert_eq!(image.content_type, FALLBACK_CONTENT_TYPE);
    }

    #[test]
    fn validation_error_reports_file_metadata_without_bytes() {
        let submit = SubmitPhoto {
            photo_file: UploadedFile {
                file_name: Some("huge.png".to_string()),
                content_type: Some("image/png".to_string()),
                size: MAX_UPLOAD_SIZE + 1,
                bytes: Vec::new(),
            },
        };

        let errors = submit.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let value = &field_errors["photo_file"][0].params["value"];

        assert_eq!(value["size"], MAX_UPLOAD_SIZE + 1);
        assert_eq!(value["file_name"], "huge.png");
        assert!(value.get("bytes").is_none());
    }
}
