//! Media attachment pipeline.
//!
//! An inbound upload flows through capability gate, upload validator,
//! integrity checker and attachment ingestor; stored attachments are
//! rendered through the resource presenter. Each stage short-circuits
//! with a typed [`MediaError`].

mod error;
mod integrity;
mod present;
mod probe;
mod schema;
mod service;
mod types;
mod validate;

pub use error::MediaError;
pub use integrity::verify_content_md5;
pub use present::Presenter;
pub use probe::inspect_payload;
pub use schema::{Context, FIELDS, FieldSpec, schema};
pub use service::{MediaRepository, MediaService};
pub use types::{
    Attachment, CreateAttachmentInput, PostRef, UpdateAttachmentInput, UploadRequest,
    ValidatedUpload,
};
pub use validate::validate;
