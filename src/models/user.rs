//! # User and Image Records
//!
//! Persistence-facing types for the user a profile photo belongs to and the
//! photo itself. A user owns at most one image at any time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to a stored image, as exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: Uuid,
}

/// The user data the photo settings page needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePhotoUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub username: String,
    pub image: Option<ImageRef>,
}

impl ProfilePhotoUser {
    /// Name shown next to the photo, falling back to the username.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.username)
    }
}

/// Row shape of the loader query: a user left-joined with its image id.
#[derive(Debug, sqlx::FromRow)]
pub struct UserWithImageRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub username: String,
    pub image_id: Option<Uuid>,
}

impl From<UserWithImageRow> for ProfilePhotoUser {
    fn from(row: UserWithImageRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            username: row.username,
            image: row.image_id.map(|id| ImageRef { id }),
        }
    }
}

/// A stored profile photo.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserImage {
    pub id: Uuid,
    pub content_type: String,
    pub blob: Vec<u8>,
    pub user_id: Uuid,
}

/// Payload of a validated "submit" form, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserImage {
    pub content_type: String,
    pub blob: Vec<u8>,
}
