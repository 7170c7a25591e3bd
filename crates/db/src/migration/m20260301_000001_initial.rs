//! Initial schema: posts, attachments and attachment metadata.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS attachment_meta CASCADE;
             DROP TABLE IF EXISTS attachments CASCADE;
             DROP TABLE IF EXISTS posts CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Parent resources attachments may be associated with
CREATE TABLE posts (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    slug VARCHAR(200) NOT NULL UNIQUE,
    author_id BIGINT NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'draft',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Attachment records for uploaded media
CREATE TABLE attachments (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    slug VARCHAR(200) NOT NULL,
    mime_type VARCHAR(100) NOT NULL,
    media_type VARCHAR(20) NOT NULL,
    storage_key TEXT NOT NULL UNIQUE,
    guid TEXT NOT NULL,
    caption TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    post_id BIGINT REFERENCES posts(id) ON DELETE SET NULL,
    author_id BIGINT NOT NULL,
    comment_status VARCHAR(10) NOT NULL DEFAULT 'open',
    ping_status VARCHAR(10) NOT NULL DEFAULT 'closed',
    media_details JSONB NOT NULL DEFAULT '{}',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Index for listing newest first
CREATE INDEX idx_attachments_created ON attachments(created_at DESC, id DESC);

-- Index for parent filtering
CREATE INDEX idx_attachments_post ON attachments(post_id) WHERE post_id IS NOT NULL;

-- Index for ownership checks
CREATE INDEX idx_attachments_author ON attachments(author_id);

-- Key/value metadata rows (alt text etc.)
CREATE TABLE attachment_meta (
    id BIGSERIAL PRIMARY KEY,
    attachment_id BIGINT NOT NULL REFERENCES attachments(id) ON DELETE CASCADE,
    meta_key VARCHAR(100) NOT NULL,
    meta_value TEXT NOT NULL,
    CONSTRAINT uq_attachment_meta UNIQUE (attachment_id, meta_key)
);

CREATE INDEX idx_attachment_meta_lookup ON attachment_meta(attachment_id, meta_key);
";
