//! # Image Store
//!
//! This module provides persistence for users' profile photos behind a trait,
//! so handlers do not depend on a particular backend.
//!
//! ## Implementations
//!
//! - [`PgImageStore`] - Production implementation backed by PostgreSQL
//! - [`MemoryImageStore`] - In-process implementation for development and tests
//!
//! ## Invariants
//!
//! A user owns at most one image. Replacing a photo removes the old row and
//! creates the new one as a single atomic step, so a failure never leaves a
//! user without the photo they had before.

mod memory;
mod postgres;

pub use memory::MemoryImageStore;
pub use postgres::PgImageStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewUserImage, ProfilePhotoUser, UserImage};

/// Errors that can occur during image store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("User not found")]
    UserNotFound,
}

/// Trait for profile photo persistence
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Fetches a user together with the id of their current image.
    ///
    /// Returns `Ok(None)` when no such user exists.
    async fn find_user(&self, user_id: Uuid) -> Result<Option<ProfilePhotoUser>, StoreError>;

    /// Removes the user's image, if any, and returns the number of rows removed.
    ///
    /// Deleting when no image exists is not an error.
    async fn delete_user_image(&self, user_id: Uuid) -> Result<u64, StoreError>;

    /// Atomically replaces the user's image with `image` and returns the new image id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UserNotFound`] if the user does not exist.
    async fn replace_user_image(
        &self,
        user_id: Uuid,
        image: NewUserImage,
    ) -> Result<Uuid, StoreError>;

    /// Fetches a stored image by its id.
    async fn find_image(&self, image_id: Uuid) -> Result<Option<UserImage>, StoreError>;
}
