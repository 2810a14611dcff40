//! # Photo Settings View
//!
//! Everything the page does on the client side, expressed without a
//! browser: the form's state machine, the crop-to-file transformation over
//! an abstract drawing surface, and the HTML the page is rendered from.

pub mod crop;
pub mod page;
pub mod state;

pub use crop::{
    CroppedFile, DisplayedCrop, DrawingSurface, PixelCrop, RasterSurface, SourceImage,
    SurfaceError, crop_to_file,
};
pub use page::render_photo_page;
pub use state::{
    ButtonStatus, DoubleCheck, DoubleCheckPress, PendingSubmission, PhotoForm, PhotoSelection,
    SelectedFile, SubmissionPhase, ViewState,
};
