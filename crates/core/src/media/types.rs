//! Media types and data structures.

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Ephemeral inbound upload, as assembled from the request boundary.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    /// Raw byte payload.
    pub body: Bytes,
    /// Declared content type (`Content-Type` header), if any.
    pub content_type: Option<String>,
    /// Declared disposition (`Content-Disposition` header), if any.
    pub content_disposition: Option<String>,
    /// Declared payload digest (`Content-MD5` header), if any.
    pub content_md5: Option<String>,
    /// Target parent resource, if the upload should be attached.
    pub post_id: Option<i64>,
    /// Caller-supplied title.
    pub title: Option<String>,
    /// Caller-supplied caption.
    pub caption: Option<String>,
    /// Caller-supplied description.
    pub description: Option<String>,
    /// Caller-supplied alternative text.
    pub alt_text: Option<String>,
}

/// Result of a successful upload validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    /// MIME type, stripped of parameters.
    pub mime_type: String,
    /// Client-declared filename from the disposition header.
    pub filename: String,
}

/// Reference to a parent resource an upload may attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostRef {
    /// Post identifier.
    pub id: i64,
    /// Author of the post.
    pub author_id: i64,
}

/// Input for creating an attachment record.
#[derive(Debug, Clone)]
pub struct CreateAttachmentInput {
    /// Title.
    pub title: String,
    /// URL-safe slug.
    pub slug: String,
    /// MIME type.
    pub mime_type: String,
    /// Media family ("image" or "file").
    pub media_type: String,
    /// Storage key of the persisted payload.
    pub storage_key: String,
    /// Stable URL recorded at creation time.
    pub guid: String,
    /// Caption text.
    pub caption: String,
    /// Description text.
    pub description: String,
    /// Alternative text, stored as auxiliary metadata.
    pub alt_text: String,
    /// Optional parent resource.
    pub post_id: Option<i64>,
    /// Author identity.
    pub author_id: i64,
    /// Comment policy ("open"/"closed").
    pub comment_status: String,
    /// Ping policy ("open"/"closed").
    pub ping_status: String,
    /// Derived media details (dimensions etc.), `{}` when unknown.
    pub media_details: serde_json::Value,
}

/// Changes to apply to an existing attachment.
///
/// `None` fields are left untouched. `post_id` uses a double option:
/// `Some(None)` detaches the attachment, `Some(Some(id))` re-parents it.
#[derive(Debug, Clone, Default)]
pub struct UpdateAttachmentInput {
    /// New title.
    pub title: Option<String>,
    /// New caption.
    pub caption: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New alternative text.
    pub alt_text: Option<String>,
    /// New comment policy.
    pub comment_status: Option<String>,
    /// New ping policy.
    pub ping_status: Option<String>,
    /// New parent resource (outer `Some` applies the change).
    pub post_id: Option<Option<i64>>,
}

/// Attachment domain model.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// Unique identifier, assigned at creation and immutable.
    pub id: i64,
    /// Title.
    pub title: String,
    /// URL-safe slug.
    pub slug: String,
    /// MIME type.
    pub mime_type: String,
    /// Media family ("image" or "file").
    pub media_type: String,
    /// Storage key of the persisted payload.
    pub storage_key: String,
    /// Stable URL recorded at creation time.
    pub guid: String,
    /// Caption text.
    pub caption: String,
    /// Description text.
    pub description: String,
    /// Alternative text, from auxiliary metadata.
    pub alt_text: String,
    /// Parent resource; `None` means unattached.
    pub post_id: Option<i64>,
    /// Author identity.
    pub author_id: i64,
    /// Comment policy ("open"/"closed").
    pub comment_status: String,
    /// Ping policy ("open"/"closed").
    pub ping_status: String,
    /// Derived media details, `{}` when unknown.
    pub media_details: serde_json::Value,
    /// Creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub modified_at: DateTime<Utc>,
}
