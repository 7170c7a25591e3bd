//! Resource presenter: attachment to external JSON representation.

use serde_json::{Map, Value, json};

use super::schema::{Context, FIELDS};
use super::types::Attachment;

/// Converts stored attachments into the external representation,
/// applying the declarative schema's context filtering.
#[derive(Debug, Clone)]
pub struct Presenter {
    site_base_url: String,
    public_base_url: String,
}

impl Presenter {
    /// Creates a presenter.
    ///
    /// `site_base_url` is used for resource links; `public_base_url` is
    /// the storage collaborator's public prefix for stored objects.
    #[must_use]
    pub fn new(site_base_url: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        Self {
            site_base_url: site_base_url.into().trim_end_matches('/').to_string(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolves the public URL for a stored key.
    #[must_use]
    pub fn source_url(&self, storage_key: &str) -> String {
        format!("{}/{}", self.public_base_url, storage_key)
    }

    /// Builds the representation for the given context.
    ///
    /// The full field set is assembled first, then filtered through the
    /// declarative schema so introspection and emission share one source
    /// of truth. `post_id` is JSON null exactly when the attachment is
    /// unattached.
    #[must_use]
    pub fn represent(&self, attachment: &Attachment, context: Context) -> Value {
        let mut full = Map::new();
        full.insert("id".into(), json!(attachment.id));
        full.insert("date".into(), json!(attachment.created_at.to_rfc3339()));
        full.insert(
            "modified".into(),
            json!(attachment.modified_at.to_rfc3339()),
        );
        full.insert("guid".into(), json!(attachment.guid));
        full.insert(
            "link".into(),
            json!(format!("{}/media/{}", self.site_base_url, attachment.slug)),
        );
        full.insert("title".into(), json!(attachment.title));
        full.insert("author".into(), json!(attachment.author_id));
        full.insert("comment_status".into(), json!(attachment.comment_status));
        full.insert("ping_status".into(), json!(attachment.ping_status));
        full.insert("slug".into(), json!(attachment.slug));
        full.insert("type".into(), json!("attachment"));
        full.insert("post_id".into(), json!(attachment.post_id));
        full.insert(
            "source_url".into(),
            json!(self.source_url(&attachment.storage_key)),
        );
        full.insert("media_type".into(), json!(attachment.media_type));
        full.insert("media_details".into(), attachment.media_details.clone());
        full.insert("caption".into(), json!(attachment.caption));
        full.insert("description".into(), json!(attachment.description));
        full.insert("alt_text".into(), json!(attachment.alt_text));

        let mut out = Map::new();
        for field in &FIELDS {
            if field.visible_in(context) {
                if let Some(value) = full.remove(field.name) {
                    out.insert(field.name.to_string(), value);
                }
            }
        }

        Value::Object(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_attachment() -> Attachment {
        Attachment {
            id: 42,
            title: "canola".to_string(),
            slug: "canola".to_string(),
            mime_type: "image/jpeg".to_string(),
            media_type: "image".to_string(),
            storage_key: "2026/08/canola.jpg".to_string(),
            guid: "http://localhost:8080/files/2026/08/canola.jpg".to_string(),
            caption: "A sample caption".to_string(),
            description: "A description".to_string(),
            alt_text: "Sample alt text".to_string(),
            post_id: None,
            author_id: 7,
            comment_status: "open".to_string(),
            ping_status: "closed".to_string(),
            media_details: serde_json::json!({"width": 640, "height": 480}),
            created_at: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
            modified_at: Utc.with_ymd_and_hms(2026, 8, 2, 12, 0, 0).unwrap(),
        }
    }

    fn presenter() -> Presenter {
        Presenter::new("http://localhost:8080", "http://localhost:8080/files/")
    }

    #[test]
    fn view_context_emits_all_fields() {
        let rep = presenter().represent(&sample_attachment(), Context::View);
        assert_eq!(rep.as_object().unwrap().len(), 18);
        assert_eq!(rep["type"], "attachment");
        assert_eq!(rep["caption"], "A sample caption");
        assert_eq!(rep["alt_text"], "Sample alt text");
        assert_eq!(
            rep["source_url"],
            "http://localhost:8080/files/2026/08/canola.jpg"
        );
        assert_eq!(rep["link"], "http://localhost:8080/media/canola");
    }

    #[test]
    fn unattached_post_id_is_null() {
        let rep = presenter().represent(&sample_attachment(), Context::View);
        assert!(rep["post_id"].is_null());
    }

    #[test]
    fn attached_post_id_is_numeric() {
        let mut attachment = sample_attachment();
        attachment.post_id = Some(9);
        let rep = presenter().represent(&attachment, Context::View);
        assert_eq!(rep["post_id"], 9);
    }

    #[test]
    fn embed_context_is_compact() {
        let rep = presenter().represent(&sample_attachment(), Context::Embed);
        let fields = rep.as_object().unwrap();
        assert!(fields.len() < 18);
        assert!(fields.contains_key("id"));
        assert!(fields.contains_key("source_url"));
        assert!(!fields.contains_key("guid"));
        assert!(!fields.contains_key("modified"));
    }

    #[test]
    fn media_details_pass_through() {
        let rep = presenter().represent(&sample_attachment(), Context::View);
        assert_eq!(rep["media_details"]["width"], 640);
        assert_eq!(rep["media_details"]["height"], 480);
    }
}
