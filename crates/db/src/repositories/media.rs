//! Media repository for database operations.
//!
//! Implements attachment CRUD operations using `SeaORM`. The alternative
//! text lives in the `attachment_meta` table and is written in the same
//! transaction as the attachment row.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{attachment_meta, attachments, posts};
use leafpress_core::media::{
    Attachment, CreateAttachmentInput, MediaError, MediaRepository, PostRef, UpdateAttachmentInput,
};

const ALT_TEXT_KEY: &str = "alt_text";

/// `SeaORM`-backed media repository implementation.
#[derive(Debug, Clone)]
pub struct SeaOrmMediaRepository {
    db: DatabaseConnection,
}

impl SeaOrmMediaRepository {
    /// Create a new media repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MediaRepository for SeaOrmMediaRepository {
    async fn create(&self, input: CreateAttachmentInput) -> Result<Attachment, MediaError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MediaError::repository(e.to_string()))?;

        let now = Utc::now();
        let active_model = attachments::ActiveModel {
            id: NotSet,
            title: Set(input.title.clone()),
            slug: Set(input.slug.clone()),
            mime_type: Set(input.mime_type.clone()),
            media_type: Set(input.media_type.clone()),
            storage_key: Set(input.storage_key.clone()),
            guid: Set(input.guid.clone()),
            caption: Set(input.caption.clone()),
            description: Set(input.description.clone()),
            post_id: Set(input.post_id),
            author_id: Set(input.author_id),
            comment_status: Set(input.comment_status.clone()),
            ping_status: Set(input.ping_status.clone()),
            media_details: Set(input.media_details.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let model = active_model
            .insert(&txn)
            .await
            .map_err(|e| MediaError::repository(e.to_string()))?;

        let meta = attachment_meta::ActiveModel {
            id: NotSet,
            attachment_id: Set(model.id),
            meta_key: Set(ALT_TEXT_KEY.to_string()),
            meta_value: Set(input.alt_text.clone()),
        };
        meta.insert(&txn)
            .await
            .map_err(|e| MediaError::repository(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| MediaError::repository(e.to_string()))?;

        Ok(to_domain(model, input.alt_text))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Attachment>, MediaError> {
        let Some(model) = attachments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| MediaError::repository(e.to_string()))?
        else {
            return Ok(None);
        };

        let alt_text = load_alt_text(&self.db, id).await?;
        Ok(Some(to_domain(model, alt_text)))
    }

    async fn list(
        &self,
        parent: Option<i64>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Attachment>, MediaError> {
        let mut query = attachments::Entity::find()
            .order_by_desc(attachments::Column::CreatedAt)
            .order_by_desc(attachments::Column::Id)
            .offset(offset)
            .limit(limit);
        if let Some(parent) = parent {
            query = query.filter(attachments::Column::PostId.eq(parent));
        }

        let models = query
            .all(&self.db)
            .await
            .map_err(|e| MediaError::repository(e.to_string()))?;

        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let meta_rows = attachment_meta::Entity::find()
            .filter(attachment_meta::Column::AttachmentId.is_in(ids))
            .filter(attachment_meta::Column::MetaKey.eq(ALT_TEXT_KEY))
            .all(&self.db)
            .await
            .map_err(|e| MediaError::repository(e.to_string()))?;

        Ok(models
            .into_iter()
            .map(|model| {
                let alt_text = meta_rows
                    .iter()
                    .find(|row| row.attachment_id == model.id)
                    .map(|row| row.meta_value.clone())
                    .unwrap_or_default();
                to_domain(model, alt_text)
            })
            .collect())
    }

    async fn count(&self, parent: Option<i64>) -> Result<u64, MediaError> {
        let mut query = attachments::Entity::find();
        if let Some(parent) = parent {
            query = query.filter(attachments::Column::PostId.eq(parent));
        }
        query
            .count(&self.db)
            .await
            .map_err(|e| MediaError::repository(e.to_string()))
    }

    async fn update(
        &self,
        id: i64,
        changes: UpdateAttachmentInput,
    ) -> Result<Option<Attachment>, MediaError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MediaError::repository(e.to_string()))?;

        let Some(model) = attachments::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| MediaError::repository(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut active: attachments::ActiveModel = model.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(caption) = changes.caption {
            active.caption = Set(caption);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(comment_status) = changes.comment_status {
            active.comment_status = Set(comment_status);
        }
        if let Some(ping_status) = changes.ping_status {
            active.ping_status = Set(ping_status);
        }
        if let Some(post_id) = changes.post_id {
            active.post_id = Set(post_id);
        }
        active.updated_at = Set(Utc::now().into());

        let model = active
            .update(&txn)
            .await
            .map_err(|e| MediaError::repository(e.to_string()))?;

        if let Some(alt_text) = changes.alt_text {
            upsert_alt_text(&txn, id, &alt_text).await?;
        }
        let alt_text = load_alt_text(&txn, id).await?;

        txn.commit()
            .await
            .map_err(|e| MediaError::repository(e.to_string()))?;

        Ok(Some(to_domain(model, alt_text)))
    }

    async fn delete(&self, id: i64) -> Result<bool, MediaError> {
        // attachment_meta rows cascade with the attachment.
        let result = attachments::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| MediaError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn find_post(&self, id: i64) -> Result<Option<PostRef>, MediaError> {
        let model = posts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| MediaError::repository(e.to_string()))?;

        Ok(model.map(|post| PostRef {
            id: post.id,
            author_id: post.author_id,
        }))
    }
}

/// Load the alt text metadata row for an attachment.
async fn load_alt_text<C: ConnectionTrait>(conn: &C, id: i64) -> Result<String, MediaError> {
    let row = attachment_meta::Entity::find()
        .filter(attachment_meta::Column::AttachmentId.eq(id))
        .filter(attachment_meta::Column::MetaKey.eq(ALT_TEXT_KEY))
        .one(conn)
        .await
        .map_err(|e| MediaError::repository(e.to_string()))?;

    Ok(row.map(|r| r.meta_value).unwrap_or_default())
}

/// Insert or replace the alt text metadata row for an attachment.
async fn upsert_alt_text<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    alt_text: &str,
) -> Result<(), MediaError> {
    let existing = attachment_meta::Entity::find()
        .filter(attachment_meta::Column::AttachmentId.eq(id))
        .filter(attachment_meta::Column::MetaKey.eq(ALT_TEXT_KEY))
        .one(conn)
        .await
        .map_err(|e| MediaError::repository(e.to_string()))?;

    match existing {
        Some(row) => {
            let mut active: attachment_meta::ActiveModel = row.into();
            active.meta_value = Set(alt_text.to_string());
            active
                .update(conn)
                .await
                .map_err(|e| MediaError::repository(e.to_string()))?;
        }
        None => {
            let meta = attachment_meta::ActiveModel {
                id: NotSet,
                attachment_id: Set(id),
                meta_key: Set(ALT_TEXT_KEY.to_string()),
                meta_value: Set(alt_text.to_string()),
            };
            meta.insert(conn)
                .await
                .map_err(|e| MediaError::repository(e.to_string()))?;
        }
    }

    Ok(())
}

/// Convert database model to domain model.
fn to_domain(model: attachments::Model, alt_text: String) -> Attachment {
    Attachment {
        id: model.id,
        title: model.title,
        slug: model.slug,
        mime_type: model.mime_type,
        media_type: model.media_type,
        storage_key: model.storage_key,
        guid: model.guid,
        caption: model.caption,
        description: model.description,
        alt_text,
        post_id: model.post_id,
        author_id: model.author_id,
        comment_status: model.comment_status,
        ping_status: model.ping_status,
        media_details: model.media_details,
        created_at: model.created_at.with_timezone(&chrono::Utc),
        modified_at: model.updated_at.with_timezone(&chrono::Utc),
    }
}
