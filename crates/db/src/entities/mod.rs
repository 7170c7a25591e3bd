//! `SeaORM` entity definitions.

pub mod attachment_meta;
pub mod attachments;
pub mod posts;
