//! Media service: orchestrates gate, validator, integrity checker and
//! ingestor over injected storage and repository collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info};

use leafpress_shared::PageRequest;

use super::error::MediaError;
use super::integrity::verify_content_md5;
use super::probe::inspect_payload;
use super::schema::Context;
use super::types::{
    Attachment, CreateAttachmentInput, PostRef, UpdateAttachmentInput, UploadRequest,
};
use super::validate::validate;
use crate::capability::{CapabilityGate, Identity};
use crate::storage::{StorageService, sanitize_filename};

/// Repository trait for attachment persistence.
///
/// Implemented by the db crate; object-safe so the API layer can inject
/// an in-memory fake in tests. Creating an attachment record together
/// with its auxiliary metadata must be a single transaction.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// Create a new attachment record (with its metadata) atomically.
    async fn create(&self, input: CreateAttachmentInput) -> Result<Attachment, MediaError>;

    /// Find an attachment by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Attachment>, MediaError>;

    /// List attachments, newest first, optionally filtered by parent.
    async fn list(
        &self,
        parent: Option<i64>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Attachment>, MediaError>;

    /// Count attachments matching the parent filter.
    async fn count(&self, parent: Option<i64>) -> Result<u64, MediaError>;

    /// Apply changes to an attachment, bumping its modified timestamp.
    async fn update(
        &self,
        id: i64,
        changes: UpdateAttachmentInput,
    ) -> Result<Option<Attachment>, MediaError>;

    /// Delete an attachment record and its metadata.
    async fn delete(&self, id: i64) -> Result<bool, MediaError>;

    /// Resolve a parent resource reference.
    async fn find_post(&self, id: i64) -> Result<Option<PostRef>, MediaError>;
}

/// Media service for the upload ingestion pipeline.
pub struct MediaService {
    storage: Arc<StorageService>,
    repo: Arc<dyn MediaRepository>,
    gate: CapabilityGate,
}

impl MediaService {
    /// Create a new media service.
    #[must_use]
    pub fn new(
        storage: Arc<StorageService>,
        repo: Arc<dyn MediaRepository>,
        gate: CapabilityGate,
    ) -> Self {
        Self {
            storage,
            repo,
            gate,
        }
    }

    /// Runs the full ingestion pipeline for an inbound upload.
    ///
    /// Stage order: capability gate, upload validator, integrity
    /// checker, ingestor. The gate runs before any body inspection, so
    /// an unauthorized identity is told so even for an empty request.
    ///
    /// # Errors
    ///
    /// Returns the first failing stage's typed error. A repository
    /// failure after the storage write rolls the stored object back.
    pub async fn create(
        &self,
        identity: &Identity,
        request: UploadRequest,
    ) -> Result<Attachment, MediaError> {
        self.gate.authorize_upload(identity)?;

        if let Some(post_id) = request.post_id {
            let post = self
                .repo
                .find_post(post_id)
                .await?
                // Unknown parents are indistinguishable from ones the
                // identity cannot edit.
                .ok_or(MediaError::CannotEdit)?;
            self.gate.authorize_parent_edit(identity, post.author_id)?;
        }

        let validated = validate(&request)?;
        verify_content_md5(&request.body, request.content_md5.as_deref())?;

        let now = Utc::now();
        let prefix = now.format("%Y/%m").to_string();
        let sanitized = sanitize_filename(&validated.filename);
        let stored_name = self.unique_name(&prefix, &sanitized).await;
        let key = format!("{prefix}/{stored_name}");

        self.storage.store(&key, request.body.clone()).await?;

        let (media_type, media_details) = inspect_payload(&validated.mime_type, &request.body);
        let stem = file_stem(&stored_name).to_string();
        let input = CreateAttachmentInput {
            title: request.title.clone().unwrap_or_else(|| stem.clone()),
            slug: slugify(&stem),
            mime_type: validated.mime_type,
            media_type,
            guid: self.storage.public_url(&key),
            storage_key: key.clone(),
            caption: request.caption.clone().unwrap_or_default(),
            description: request.description.clone().unwrap_or_default(),
            alt_text: request.alt_text.clone().unwrap_or_default(),
            post_id: request.post_id,
            author_id: identity.user_id,
            comment_status: "open".to_string(),
            ping_status: "closed".to_string(),
            media_details,
        };

        match self.repo.create(input).await {
            Ok(attachment) => {
                info!(
                    attachment_id = attachment.id,
                    author_id = identity.user_id,
                    storage_key = %key,
                    "attachment created"
                );
                Ok(attachment)
            }
            Err(err) => {
                // No orphaned bytes: undo the storage write before
                // reporting the record failure.
                if let Err(cleanup) = self.storage.delete(&key).await {
                    error!(storage_key = %key, error = %cleanup, "rollback of stored object failed");
                }
                Err(err)
            }
        }
    }

    /// Retrieves an attachment for the given context.
    ///
    /// The edit context requires edit capability on the attachment; view
    /// and embed are available to any authenticated identity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids and `ForbiddenContext` when
    /// the edit context is requested without edit capability.
    pub async fn retrieve(
        &self,
        identity: Option<&Identity>,
        id: i64,
        context: Context,
    ) -> Result<Attachment, MediaError> {
        let attachment = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MediaError::NotFound(id))?;

        if context == Context::Edit {
            let allowed = identity
                .is_some_and(|i| self.gate.provider().can_edit(i, attachment.author_id));
            if !allowed {
                return Err(MediaError::ForbiddenContext);
            }
        }

        Ok(attachment)
    }

    /// Lists attachments, newest first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns a repository error if the query fails.
    pub async fn list(
        &self,
        parent: Option<i64>,
        page: &PageRequest,
    ) -> Result<(Vec<Attachment>, u64), MediaError> {
        let items = self.repo.list(parent, page.offset(), page.limit()).await?;
        let total = self.repo.count(parent).await?;
        Ok((items, total))
    }

    /// Applies an update to an attachment.
    ///
    /// Preserves id and creation timestamp; bumps the modified
    /// timestamp. Re-parenting re-runs the parent edit check; clearing
    /// the parent needs no parent capability.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, a capability denial, or a repository error.
    pub async fn update(
        &self,
        identity: &Identity,
        id: i64,
        changes: UpdateAttachmentInput,
    ) -> Result<Attachment, MediaError> {
        let attachment = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MediaError::NotFound(id))?;

        self.gate.authorize_edit(identity, attachment.author_id)?;

        if let Some(Some(post_id)) = changes.post_id {
            let post = self
                .repo
                .find_post(post_id)
                .await?
                .ok_or(MediaError::CannotEdit)?;
            self.gate.authorize_parent_edit(identity, post.author_id)?;
        }

        let updated = self
            .repo
            .update(id, changes)
            .await?
            .ok_or(MediaError::NotFound(id))?;

        info!(attachment_id = id, editor_id = identity.user_id, "attachment updated");
        Ok(updated)
    }

    /// Deletes an attachment and releases its stored bytes.
    ///
    /// The record is removed first; the stored object is deleted
    /// best-effort afterwards. A dangling object is recoverable garbage,
    /// a dangling record would be a broken resource.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, a capability denial, or a repository error.
    pub async fn delete(&self, identity: &Identity, id: i64) -> Result<(), MediaError> {
        let attachment = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MediaError::NotFound(id))?;

        self.gate.authorize_delete(identity, attachment.author_id)?;

        let removed = self.repo.delete(id).await?;
        if !removed {
            return Err(MediaError::NotFound(id));
        }

        if let Err(err) = self.storage.delete(&attachment.storage_key).await {
            error!(
                attachment_id = id,
                storage_key = %attachment.storage_key,
                error = %err,
                "failed to release stored object"
            );
        }

        info!(attachment_id = id, "attachment deleted");
        Ok(())
    }

    /// Finds a stored name under `prefix` that does not collide with an
    /// existing object, suffixing `-1`, `-2`, ... as needed.
    async fn unique_name(&self, prefix: &str, filename: &str) -> String {
        let (stem, ext) = split_name(filename);
        let mut candidate = filename.to_string();
        let mut counter = 1u32;

        while self.storage.exists(&format!("{prefix}/{candidate}")).await {
            candidate = match ext {
                Some(ext) => format!("{stem}-{counter}.{ext}"),
                None => format!("{stem}-{counter}"),
            };
            counter += 1;
        }

        candidate
    }
}

/// Splits a filename into stem and extension.
fn split_name(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    }
}

/// Returns the stem of a filename.
fn file_stem(filename: &str) -> &str {
    split_name(filename).0
}

/// Derives a URL-safe slug: lowercase alphanumerics with single hyphen
/// separators.
fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_was_hyphen = true;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Role, RoleCapabilities};
    use crate::storage::StorageConfig;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// In-memory repository for testing.
    struct MockMediaRepository {
        attachments: Mutex<HashMap<i64, Attachment>>,
        posts: Mutex<HashMap<i64, PostRef>>,
        next_id: AtomicI64,
        fail_create: bool,
    }

    impl MockMediaRepository {
        fn new() -> Self {
            Self {
                attachments: Mutex::new(HashMap::new()),
                posts: Mutex::new(HashMap::new()),
                next_id: AtomicI64::new(1),
                fail_create: false,
            }
        }

        fn failing_on_create() -> Self {
            Self {
                fail_create: true,
                ..Self::new()
            }
        }

        fn add_post(&self, id: i64, author_id: i64) {
            self.posts
                .lock()
                .unwrap()
                .insert(id, PostRef { id, author_id });
        }
    }

    #[async_trait]
    impl MediaRepository for MockMediaRepository {
        async fn create(&self, input: CreateAttachmentInput) -> Result<Attachment, MediaError> {
            if self.fail_create {
                return Err(MediaError::repository("insert failed"));
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let now = Utc::now();
            let attachment = Attachment {
                id,
                title: input.title,
                slug: input.slug,
                mime_type: input.mime_type,
                media_type: input.media_type,
                storage_key: input.storage_key,
                guid: input.guid,
                caption: input.caption,
                description: input.description,
                alt_text: input.alt_text,
                post_id: input.post_id,
                author_id: input.author_id,
                comment_status: input.comment_status,
                ping_status: input.ping_status,
                media_details: input.media_details,
                created_at: now,
                modified_at: now,
            };
            self.attachments
                .lock()
                .unwrap()
                .insert(id, attachment.clone());
            Ok(attachment)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Attachment>, MediaError> {
            Ok(self.attachments.lock().unwrap().get(&id).cloned())
        }

        async fn list(
            &self,
            parent: Option<i64>,
            offset: u64,
            limit: u64,
        ) -> Result<Vec<Attachment>, MediaError> {
            let mut items: Vec<Attachment> = self
                .attachments
                .lock()
                .unwrap()
                .values()
                .filter(|a| parent.is_none() || a.post_id == parent)
                .cloned()
                .collect();
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(items
                .into_iter()
                .skip(usize::try_from(offset).unwrap())
                .take(usize::try_from(limit).unwrap())
                .collect())
        }

        async fn count(&self, parent: Option<i64>) -> Result<u64, MediaError> {
            let count = self
                .attachments
                .lock()
                .unwrap()
                .values()
                .filter(|a| parent.is_none() || a.post_id == parent)
                .count();
            Ok(count as u64)
        }

        async fn update(
            &self,
            id: i64,
            changes: UpdateAttachmentInput,
        ) -> Result<Option<Attachment>, MediaError> {
            let mut attachments = self.attachments.lock().unwrap();
            let Some(attachment) = attachments.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(title) = changes.title {
                attachment.title = title;
            }
            if let Some(caption) = changes.caption {
                attachment.caption = caption;
            }
            if let Some(description) = changes.description {
                attachment.description = description;
            }
            if let Some(alt_text) = changes.alt_text {
                attachment.alt_text = alt_text;
            }
            if let Some(comment_status) = changes.comment_status {
                attachment.comment_status = comment_status;
            }
            if let Some(ping_status) = changes.ping_status {
                attachment.ping_status = ping_status;
            }
            if let Some(post_id) = changes.post_id {
                attachment.post_id = post_id;
            }
            attachment.modified_at = Utc::now();
            Ok(Some(attachment.clone()))
        }

        async fn delete(&self, id: i64) -> Result<bool, MediaError> {
            Ok(self.attachments.lock().unwrap().remove(&id).is_some())
        }

        async fn find_post(&self, id: i64) -> Result<Option<PostRef>, MediaError> {
            Ok(self.posts.lock().unwrap().get(&id).copied())
        }
    }

    fn memory_storage() -> Arc<StorageService> {
        Arc::new(
            StorageService::from_config(StorageConfig::memory("http://localhost:8080/files"))
                .unwrap(),
        )
    }

    fn service_with(repo: Arc<MockMediaRepository>) -> (MediaService, Arc<StorageService>) {
        let storage = memory_storage();
        let service = MediaService::new(
            storage.clone(),
            repo,
            CapabilityGate::new(Arc::new(RoleCapabilities)),
        );
        (service, storage)
    }

    fn valid_upload() -> UploadRequest {
        UploadRequest {
            body: Bytes::from_static(b"fake image bytes"),
            content_type: Some("image/jpeg".to_string()),
            content_disposition: Some("filename=canola.jpg".to_string()),
            ..UploadRequest::default()
        }
    }

    const AUTHOR: Identity = Identity::new(7, Role::Author);
    const CONTRIBUTOR: Identity = Identity::new(8, Role::Contributor);

    #[tokio::test]
    async fn gate_runs_before_validation() {
        let (service, _) = service_with(Arc::new(MockMediaRepository::new()));

        // Empty request, but the missing capability is reported first.
        let err = service
            .create(&CONTRIBUTOR, UploadRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::CannotCreate));
    }

    #[tokio::test]
    async fn foreign_parent_is_cannot_edit() {
        let repo = Arc::new(MockMediaRepository::new());
        repo.add_post(11, 99); // owned by someone else
        let (service, _) = service_with(repo);

        let request = UploadRequest {
            post_id: Some(11),
            ..UploadRequest::default()
        };
        let err = service.create(&AUTHOR, request).await.unwrap_err();
        assert!(matches!(err, MediaError::CannotEdit));
    }

    #[tokio::test]
    async fn unknown_parent_is_cannot_edit() {
        let (service, _) = service_with(Arc::new(MockMediaRepository::new()));

        let request = UploadRequest {
            post_id: Some(404),
            ..valid_upload()
        };
        let err = service.create(&AUTHOR, request).await.unwrap_err();
        assert!(matches!(err, MediaError::CannotEdit));
    }

    #[tokio::test]
    async fn hash_mismatch_rejected_before_storage() {
        let (service, storage) = service_with(Arc::new(MockMediaRepository::new()));

        let request = UploadRequest {
            content_md5: Some("abc123".to_string()),
            ..valid_upload()
        };
        let err = service.create(&AUTHOR, request).await.unwrap_err();
        assert!(matches!(err, MediaError::HashMismatch));

        let now = Utc::now();
        let key = format!("{}/canola.jpg", now.format("%Y/%m"));
        assert!(!storage.exists(&key).await);
    }

    #[tokio::test]
    async fn successful_create_persists_bytes_and_record() {
        let (service, storage) = service_with(Arc::new(MockMediaRepository::new()));

        let attachment = service.create(&AUTHOR, valid_upload()).await.unwrap();

        assert_eq!(attachment.author_id, 7);
        assert_eq!(attachment.mime_type, "image/jpeg");
        assert_eq!(attachment.media_type, "image");
        assert_eq!(attachment.slug, "canola");
        assert_eq!(attachment.post_id, None);
        assert!(attachment.storage_key.ends_with("/canola.jpg"));
        assert!(storage.exists(&attachment.storage_key).await);

        let stored = storage.read(&attachment.storage_key).await.unwrap();
        assert_eq!(stored, Bytes::from_static(b"fake image bytes"));
    }

    #[tokio::test]
    async fn duplicate_filenames_get_numeric_suffixes() {
        let (service, _) = service_with(Arc::new(MockMediaRepository::new()));

        let first = service.create(&AUTHOR, valid_upload()).await.unwrap();
        let second = service.create(&AUTHOR, valid_upload()).await.unwrap();
        let third = service.create(&AUTHOR, valid_upload()).await.unwrap();

        assert!(first.storage_key.ends_with("/canola.jpg"));
        assert!(second.storage_key.ends_with("/canola-1.jpg"));
        assert!(third.storage_key.ends_with("/canola-2.jpg"));
        assert_eq!(second.slug, "canola-1");
    }

    #[tokio::test]
    async fn failed_record_creation_rolls_back_storage() {
        let repo = Arc::new(MockMediaRepository::failing_on_create());
        let (service, storage) = service_with(repo);

        let err = service.create(&AUTHOR, valid_upload()).await.unwrap_err();
        assert!(matches!(err, MediaError::Repository(_)));

        let now = Utc::now();
        let key = format!("{}/canola.jpg", now.format("%Y/%m"));
        assert!(!storage.exists(&key).await, "orphaned bytes left behind");
    }

    #[tokio::test]
    async fn edit_context_requires_edit_capability() {
        let repo = Arc::new(MockMediaRepository::new());
        let (service, _) = service_with(repo);

        let attachment = service.create(&AUTHOR, valid_upload()).await.unwrap();

        // Another author cannot use the edit context.
        let other = Identity::new(8, Role::Author);
        let err = service
            .retrieve(Some(&other), attachment.id, Context::Edit)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::ForbiddenContext));

        // The owner can.
        let got = service
            .retrieve(Some(&AUTHOR), attachment.id, Context::Edit)
            .await
            .unwrap();
        assert_eq!(got.id, attachment.id);

        // View needs no capability.
        assert!(
            service
                .retrieve(Some(&other), attachment.id, Context::View)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn update_preserves_identity_and_creation_time() {
        let (service, _) = service_with(Arc::new(MockMediaRepository::new()));
        let created = service.create(&AUTHOR, valid_upload()).await.unwrap();

        let changes = UpdateAttachmentInput {
            caption: Some("new caption".to_string()),
            ..UpdateAttachmentInput::default()
        };
        let updated = service.update(&AUTHOR, created.id, changes).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.caption, "new caption");
        assert!(updated.modified_at >= created.modified_at);
    }

    #[tokio::test]
    async fn reparenting_reruns_the_parent_check() {
        let repo = Arc::new(MockMediaRepository::new());
        repo.add_post(5, 7); // owned by the author
        repo.add_post(6, 99); // owned by someone else
        let (service, _) = service_with(repo);

        let created = service.create(&AUTHOR, valid_upload()).await.unwrap();

        let ok = service
            .update(
                &AUTHOR,
                created.id,
                UpdateAttachmentInput {
                    post_id: Some(Some(5)),
                    ..UpdateAttachmentInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(ok.post_id, Some(5));

        let err = service
            .update(
                &AUTHOR,
                created.id,
                UpdateAttachmentInput {
                    post_id: Some(Some(6)),
                    ..UpdateAttachmentInput::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::CannotEdit));

        // Clearing the parent needs no parent capability.
        let cleared = service
            .update(
                &AUTHOR,
                created.id,
                UpdateAttachmentInput {
                    post_id: Some(None),
                    ..UpdateAttachmentInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.post_id, None);
    }

    #[tokio::test]
    async fn delete_releases_record_and_bytes() {
        let (service, storage) = service_with(Arc::new(MockMediaRepository::new()));
        let created = service.create(&AUTHOR, valid_upload()).await.unwrap();

        service.delete(&AUTHOR, created.id).await.unwrap();

        assert!(!storage.exists(&created.storage_key).await);
        let err = service
            .retrieve(Some(&AUTHOR), created.id, Context::View)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_requires_capability() {
        let (service, _) = service_with(Arc::new(MockMediaRepository::new()));
        let created = service.create(&AUTHOR, valid_upload()).await.unwrap();

        let other = Identity::new(8, Role::Author);
        let err = service.delete(&other, created.id).await.unwrap_err();
        assert!(matches!(err, MediaError::CannotDelete));
    }

    #[tokio::test]
    async fn list_filters_by_parent() {
        let repo = Arc::new(MockMediaRepository::new());
        repo.add_post(5, 7);
        let (service, _) = service_with(repo);

        service.create(&AUTHOR, valid_upload()).await.unwrap();
        service
            .create(
                &AUTHOR,
                UploadRequest {
                    post_id: Some(5),
                    ..valid_upload()
                },
            )
            .await
            .unwrap();

        let page = PageRequest::default();
        let (all, total) = service.list(None, &page).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(total, 2);

        let (attached, total) = service.list(Some(5), &page).await.unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(total, 1);
        assert_eq!(attached[0].post_id, Some(5));
    }

    #[test]
    fn slugify_cases() {
        assert_eq!(slugify("Canola Field"), "canola-field");
        assert_eq!(slugify("canola-1"), "canola-1");
        assert_eq!(slugify("__weird__name__"), "weird-name");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn split_name_cases() {
        assert_eq!(split_name("canola.jpg"), ("canola", Some("jpg")));
        assert_eq!(split_name("archive.tar.gz"), ("archive.tar", Some("gz")));
        assert_eq!(split_name("noext"), ("noext", None));
        assert_eq!(split_name(".hidden"), (".hidden", None));
    }
}
