//! `SeaORM` Entity for the attachments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub mime_type: String,
    pub media_type: String,
    pub storage_key: String,
    pub guid: String,
    pub caption: String,
    pub description: String,
    pub post_id: Option<i64>,
    pub author_id: i64,
    pub comment_status: String,
    pub ping_status: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub media_details: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::posts::Entity",
        from = "Column::PostId",
        to = "super::posts::Column::Id"
    )]
    Posts,
    #[sea_orm(has_many = "super::attachment_meta::Entity")]
    AttachmentMeta,
}

impl Related<super::posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::attachment_meta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttachmentMeta.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
