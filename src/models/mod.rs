mod photo_form;
mod state;
mod submission;
mod user;

pub use photo_form::{
    IMAGE_REQUIRED_MESSAGE, IMAGE_TOO_LARGE_MESSAGE, INVALID_INTENT_MESSAGE, PhotoAction,
};
pub use state::AppState;
pub use submission::{ActionResponse, Intent, SubmissionResult, SubmissionStatus};
pub use user::{ImageRef, NewUserImage, ProfilePhotoUser, UserImage, UserWithImageRow};
