//! # Photo Form State
//!
//! Client-side state of the photo settings page as an explicit state
//! machine: which file (if any) is selected and whether it has been cropped,
//! the armed/unarmed delete confirmation, and the phase of the last
//! submission. Every transition is driven by a single user action.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use tracing::{debug, warn};

use super::crop::{
    CroppedFile, DisplayedCrop, DrawingSurface, PixelCrop, SourceImage, crop_to_file,
};
use crate::models::{ImageRef, Intent, ProfilePhotoUser, SubmissionResult, SubmissionStatus};
use crate::utils::constant::{CROPPED_FILE_NAME, USER_IMAGES_PATH};

/// A file held by the form's file field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// The file read as a `data:` URL.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, BASE64.encode(&self.bytes))
    }
}

impl From<CroppedFile> for SelectedFile {
    fn from(file: CroppedFile) -> Self {
        Self {
            name: file.name,
            content_type: file.content_type.to_string(),
            bytes: file.bytes,
        }
    }
}

/// The file selection, from the page's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSelection {
    NoFileSelected,
    Uncropped {
        original: SelectedFile,
        preview: String,
    },
    Cropped {
        original: SelectedFile,
        preview: String,
        cropped: SelectedFile,
    },
}

/// Named view states the page renders differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    NoFileSelected,
    FileSelectedUncropped,
    FileSelectedCropped,
}

/// Two-press confirmation: the first press arms, the second one confirms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleCheck {
    armed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleCheckPress {
    Armed,
    Confirmed,
}

impl DoubleCheck {
    pub fn press(&mut self) -> DoubleCheckPress {
        if self.armed {
            self.armed = false;
            DoubleCheckPress::Confirmed
        } else {
            self.armed = true;
            DoubleCheckPress::Armed
        }
    }

    pub fn reset(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

/// Where the form is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Pending(Intent),
    Settled(SubmissionStatus),
}

/// What a button should show for its intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// Fields the page sends when a submission starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub intent: Intent,
    pub photo_file: Option<SelectedFile>,
}

/// State of the photo settings form.
#[derive(Debug, Clone)]
pub struct PhotoForm {
    current_image: Option<ImageRef>,
    selection: PhotoSelection,
    delete_check: DoubleCheck,
    phase: SubmissionPhase,
    last_result: Option<SubmissionResult>,
}

impl PhotoForm {
    pub fn new(user: &ProfilePhotoUser) -> Self {
        Self {
            current_image: user.image,
            selection: PhotoSelection::NoFileSelected,
            delete_check: DoubleCheck::default(),
            phase: SubmissionPhase::Idle,
            last_result: None,
        }
    }

    /// Re-renders the form with a result reported by the server.
    pub fn with_result(mut self, result: SubmissionResult) -> Self {
        self.phase = SubmissionPhase::Settled(result.status);
        self.last_result = Some(result);
        self
    }

    /// Restores a delete confirmation the previous render had armed.
    pub fn with_delete_armed(mut self, armed: bool) -> Self {
        if armed && self.current_image.is_some() {
            self.delete_check.press();
        }
        self
    }

    pub fn view_state(&self) -> ViewState {
        match self.selection {
            PhotoSelection::NoFileSelected => ViewState::NoFileSelected,
            PhotoSelection::Uncropped { .. } => ViewState::FileSelectedUncropped,
            PhotoSelection::Cropped { .. } => ViewState::FileSelectedCropped,
        }
    }

    pub fn selection(&self) -> &PhotoSelection {
        &self.selection
    }

    pub fn current_image(&self) -> Option<ImageRef> {
        self.current_image
    }

    pub fn delete_armed(&self) -> bool {
        self.delete_check.is_armed()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn last_result(&self) -> Option<&SubmissionResult> {
        self.last_result.as_ref()
    }

    /// Source for the `<img>` element: the pending file's preview, the stored
    /// image, or nothing.
    pub fn image_src(&self) -> Option<String> {
        match &self.selection {
            PhotoSelection::Uncropped { preview, .. } | PhotoSelection::Cropped { preview, .. } => {
                Some(preview.clone())
            }
            PhotoSelection::NoFileSelected => self
                .current_image
                .map(|image| format!("{USER_IMAGES_PATH}/{}", image.id)),
        }
    }

    /// The user picked a file: read it as a data URL and show the crop widget.
    pub fn select_file(&mut self, file: SelectedFile) {
        debug!(name = %file.name, size = file.bytes.len(), "File selected");
        let preview = file.data_url();
        self.selection = PhotoSelection::Uncropped {
            original: file,
            preview,
        };
        self.delete_check.reset();
    }

    /// Drops the pending file and shows the stored image again.
    pub fn reset_selection(&mut self) {
        self.selection = PhotoSelection::NoFileSelected;
    }

    /// The page was left or re-entered; any armed confirmation is dropped.
    pub fn navigate(&mut self) {
        self.delete_check.reset();
    }

    /// Crop widget reported a completed crop in displayed coordinates.
    ///
    /// Returns whether a cropped file replaced the form's file value.
    pub fn complete_crop(
        &mut self,
        surface: &impl DrawingSurface,
        crop: DisplayedCrop,
        displayed_width: f64,
        displayed_height: f64,
    ) -> bool {
        let Some(source) = self.decode_original(surface) else {
            return false;
        };
        let Some(pixel_crop) = crop.to_source_pixels(displayed_width, displayed_height, &source)
        else {
            warn!("Crop widget reported a degenerate display size");
            return false;
        };
        self.apply_crop(surface, &source, pixel_crop)
    }

    /// Same as [`complete_crop`](Self::complete_crop) with a rectangle
    /// already in source pixels.
    pub fn complete_pixel_crop(&mut self, surface: &impl DrawingSurface, crop: PixelCrop) -> bool {
        let Some(source) = self.decode_original(surface) else {
            return false;
        };
        self.apply_crop(surface, &source, crop)
    }

    fn decode_original(&self, surface: &impl DrawingSurface) -> Option<SourceImage> {
        let original = match &self.selection {
            PhotoSelection::NoFileSelected => {
                warn!("Crop completed without a selected file");
                return None;
            }
            PhotoSelection::Uncropped { original, .. } | PhotoSelection::Cropped { original, .. } => {
                original
            }
        };

        SourceImage::decode(surface, &original.bytes)
            .inspect_err(|e| warn!(error = %e, "Could not decode selected file, keeping original"))
            .ok()
    }

    fn apply_crop(
        &mut self,
        surface: &impl DrawingSurface,
        source: &SourceImage,
        crop: PixelCrop,
    ) -> bool {
        let Some(cropped) = crop_to_file(surface, source, crop, CROPPED_FILE_NAME) else {
            warn!(?crop, "No cropped file produced, keeping original");
            return false;
        };

        let selection = std::mem::replace(&mut self.selection, PhotoSelection::NoFileSelected);
        self.selection = match selection {
            PhotoSelection::Uncropped { original, preview }
            | PhotoSelection::Cropped {
                original, preview, ..
            } => PhotoSelection::Cropped {
                original,
                preview,
                cropped: cropped.into(),
            },
            PhotoSelection::NoFileSelected => PhotoSelection::NoFileSelected,
        };
        true
    }

    /// The file the form will submit: the cropped one when present.
    pub fn file_to_submit(&self) -> Option<&SelectedFile> {
        match &self.selection {
            PhotoSelection::NoFileSelected => None,
            PhotoSelection::Uncropped { original, .. } => Some(original),
            PhotoSelection::Cropped { cropped, .. } => Some(cropped),
        }
    }

    /// Starts a `submit` request, if a file is selected and nothing is in flight.
    pub fn submit_photo(&mut self) -> Option<PendingSubmission> {
        if matches!(self.phase, SubmissionPhase::Pending(_)) {
            return None;
        }
        let photo_file = self.file_to_submit()?.clone();
        self.phase = SubmissionPhase::Pending(Intent::Submit);

        Some(PendingSubmission {
            intent: Intent::Submit,
            photo_file: Some(photo_file),
        })
    }

    /// Delete button pressed. The first press arms the confirmation; the
    /// second press while armed starts the `delete` request.
    pub fn press_delete(&mut self) -> Option<PendingSubmission> {
        if self.current_image.is_none() || matches!(self.phase, SubmissionPhase::Pending(_)) {
            return None;
        }

        match self.delete_check.press() {
            DoubleCheckPress::Armed => None,
            DoubleCheckPress::Confirmed => {
                self.phase = SubmissionPhase::Pending(Intent::Delete);
                Some(PendingSubmission {
                    intent: Intent::Delete,
                    photo_file: None,
                })
            }
        }
    }

    /// The in-flight request finished with `result`.
    pub fn settle(&mut self, result: SubmissionResult) {
        if result.status == SubmissionStatus::Success {
            self.selection = PhotoSelection::NoFileSelected;
            if result.intent == Some(Intent::Delete) {
                self.current_image = None;
            }
        }
        self.phase = SubmissionPhase::Settled(result.status);
        self.last_result = Some(result);
    }

    /// Button status for `intent`: pending only while that intent is in
    /// flight, otherwise the outcome of the last submission with that intent.
    pub fn button_status(&self, intent: Intent) -> ButtonStatus {
        match self.phase {
            SubmissionPhase::Pending(in_flight) if in_flight == intent => ButtonStatus::Pending,
            SubmissionPhase::Settled(status)
                if self.last_result.as_ref().and_then(|r| r.intent) == Some(intent) =>
            {
                match status {
                    SubmissionStatus::Success => ButtonStatus::Success,
                    SubmissionStatus::Error => ButtonStatus::Error,
                    SubmissionStatus::Idle => ButtonStatus::Idle,
                }
            }
            _ => ButtonStatus::Idle,
        }
    }

    /// Errors the last result reported for `field`.
    pub fn errors_for(&self, field: &str) -> &[String] {
        self.last_result
            .as_ref()
            .map(|result| result.errors_for(field))
            .unwrap_or_default()
    }
}
