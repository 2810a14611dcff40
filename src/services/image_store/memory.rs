use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{ImageStore, StoreError};
use crate::models::{ImageRef, NewUserImage, ProfilePhotoUser, UserImage};

#[derive(Debug, Clone)]
struct StoredUser {
    name: Option<String>,
    username: String,
    image: Option<UserImage>,
}

/// In-memory image store for development and testing
///
/// Each user lives behind its own map entry, so replacing a photo happens
/// under that entry's lock and concurrent writers for the same user are
/// serialized: the last one to acquire the entry wins.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
    users: DashMap<Uuid, StoredUser>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user and returns their id.
    pub fn insert_user(&self, name: Option<&str>, username: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.users.insert(
            id,
            StoredUser {
                name: name.map(str::to_string),
                username: username.to_string(),
                image: None,
            },
        );
        info!(user_id = %id, %username, "Registered in-memory user");
        id
    }

    /// Total number of stored images across all users.
    pub fn image_count(&self) -> usize {
        self.users
            .iter()
            .filter(|entry| entry.image.is_some())
            .count()
    }

    /// The image currently owned by `user_id`, if any.
    pub fn image_of(&self, user_id: Uuid) -> Option<UserImage> {
        self.users
            .get(&user_id)
            .and_then(|user| user.image.clone())
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<ProfilePhotoUser>, StoreError> {
        Ok(self.users.get(&user_id).map(|user| ProfilePhotoUser {
            id: user_id,
            name: user.name.clone(),
            username: user.username.clone(),
            image: user.image.as_ref().map(|image| ImageRef { id: image.id }),
        }))
    }

    #[instrument(skip(self))]
    async fn delete_user_image(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let removed = self
            .users
            .get_mut(&user_id)
            .and_then(|mut user| user.image.take())
            .map_or(0, |_| 1);

        debug!(removed, "Deleted in-memory user image");
        Ok(removed)
    }

    #[instrument(skip(self, image), fields(size = image.blob.len()))]
    async fn replace_user_image(
        &self,
        user_id: Uuid,
        image: NewUserImage,
    ) -> Result<Uuid, StoreError> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::UserNotFound)?;

        let image_id = Uuid::new_v4();
        user.image = Some(UserImage {
            id: image_id,
            content_type: image.content_type,
            blob: image.blob,
            user_id,
        });

        debug!(%image_id, "In-memory user image replaced");
        Ok(image_id)
    }

    async fn find_image(&self, image_id: Uuid) -> Result<Option<UserImage>, StoreError> {
        Ok(self
            .users
            .iter()
            .find_map(|entry| entry.image.clone().filter(|image| image.id == image_id)))
    }
}
