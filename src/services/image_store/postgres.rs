use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument, trace, warn};
use uuid::Uuid;

use super::{ImageStore, StoreError};
use crate::models::{NewUserImage, ProfilePhotoUser, UserImage, UserWithImageRow};

/// PostgreSQL-backed image store
///
/// Relies on the `user_images.user_id` unique constraint to hold the
/// one-image-per-user invariant at the database level.
pub struct PgImageStore {
    db_pool: PgPool,
}

impl PgImageStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ImageStore for PgImageStore {
    #[instrument(skip(self))]
    async fn find_user(&self, user_id: Uuid) -> Result<Option<ProfilePhotoUser>, StoreError> {
        trace!("Querying user with image reference");

        let row = sqlx::query_as::<_, UserWithImageRow>(
            r#"
            SELECT u.id, u.name, u.username, i.id AS image_id
            FROM users u
            LEFT JOIN user_images i ON i.user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(row.map(ProfilePhotoUser::from))
    }

    #[instrument(skip(self))]
    async fn delete_user_image(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let removed = sqlx::query("DELETE FROM user_images WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db_pool)
            .await?
            .rows_affected();

        debug!(removed, "Deleted user image rows");
        Ok(removed)
    }

    #[instrument(
        skip(self, image),
        fields(content_type = %image.content_type, size = image.blob.len())
    )]
    async fn replace_user_image(
        &self,
        user_id: Uuid,
        image: NewUserImage,
    ) -> Result<Uuid, StoreError> {
        let mut tx = self.db_pool.begin().await?;

        let removed = sqlx::query("DELETE FROM user_images WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        trace!(removed, "Removed previous image inside transaction");

        // Dropping `tx` on an early return rolls the delete back.
        let image_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO user_images (content_type, blob, user_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&image.content_type)
        .bind(&image.blob)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                warn!("Image insert referenced a missing user");
                return StoreError::UserNotFound;
            }
            StoreError::Db(e)
        })?;

        tx.commit().await?;

        debug!(%image_id, "User image replaced");
        Ok(image_id)
    }

    #[instrument(skip(self))]
    async fn find_image(&self, image_id: Uuid) -> Result<Option<UserImage>, StoreError> {
        let image = sqlx::query_as::<_, UserImage>(
            "SELECT id, content_type, blob, user_id FROM user_images WHERE id = $1",
        )
        .bind(image_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(image)
    }
}
