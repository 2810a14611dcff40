//! # HTTP Request Handlers
//!
//! This module contains all HTTP request handlers of the photo settings service.
//! Each handler is responsible for processing specific HTTP requests and returning
//! appropriate responses.
//!
//! ## Available Handlers
//!
//! - **Health Check** (`health_check`) - Application health monitoring
//! - **Profile Photo** (`profile_photo`) - Loader and action of the photo settings route
//! - **User Image** (`user_image`) - Serving stored photos by id

mod health_check;
mod profile_photo;
mod user_image;

pub use health_check::*;
pub use profile_photo::*;
pub use user_image::*;
