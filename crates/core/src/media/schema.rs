//! Declarative representation schema.
//!
//! One table drives both schema introspection and context-based field
//! filtering, so the two can never drift apart.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// View mode controlling which representation fields are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    /// Default context: all public fields.
    #[default]
    View,
    /// Editing context: all fields; requires edit capability.
    Edit,
    /// Compact context for embedding.
    Embed,
}

impl Context {
    /// Wire name of the context.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Embed => "embed",
        }
    }
}

/// One field of the resource representation.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name in the representation.
    pub name: &'static str,
    /// JSON type emitted for the field.
    pub kind: &'static str,
    /// Contexts the field appears in.
    pub contexts: &'static [Context],
    /// Whether clients may change the field through updates.
    pub readonly: bool,
}

impl FieldSpec {
    /// Whether the field is visible in the given context.
    #[must_use]
    pub fn visible_in(&self, context: Context) -> bool {
        self.contexts.contains(&context)
    }
}

const ALL: &[Context] = &[Context::View, Context::Edit, Context::Embed];
const VIEW_EDIT: &[Context] = &[Context::View, Context::Edit];

/// The fixed field set of the attachment representation.
pub const FIELDS: [FieldSpec; 18] = [
    FieldSpec { name: "id", kind: "integer", contexts: ALL, readonly: true },
    FieldSpec { name: "date", kind: "string", contexts: ALL, readonly: true },
    FieldSpec { name: "modified", kind: "string", contexts: VIEW_EDIT, readonly: true },
    FieldSpec { name: "guid", kind: "string", contexts: VIEW_EDIT, readonly: true },
    FieldSpec { name: "link", kind: "string", contexts: ALL, readonly: true },
    FieldSpec { name: "title", kind: "string", contexts: ALL, readonly: false },
    FieldSpec { name: "author", kind: "integer", contexts: ALL, readonly: true },
    FieldSpec { name: "comment_status", kind: "string", contexts: VIEW_EDIT, readonly: false },
    FieldSpec { name: "ping_status", kind: "string", contexts: VIEW_EDIT, readonly: false },
    FieldSpec { name: "slug", kind: "string", contexts: ALL, readonly: true },
    FieldSpec { name: "type", kind: "string", contexts: ALL, readonly: true },
    FieldSpec { name: "post_id", kind: "integer", contexts: VIEW_EDIT, readonly: false },
    FieldSpec { name: "source_url", kind: "string", contexts: ALL, readonly: true },
    FieldSpec { name: "media_type", kind: "string", contexts: ALL, readonly: true },
    FieldSpec { name: "media_details", kind: "object", contexts: ALL, readonly: true },
    FieldSpec { name: "caption", kind: "string", contexts: VIEW_EDIT, readonly: false },
    FieldSpec { name: "description", kind: "string", contexts: VIEW_EDIT, readonly: false },
    FieldSpec { name: "alt_text", kind: "string", contexts: VIEW_EDIT, readonly: false },
];

/// Renders the schema as a JSON Schema object for introspection.
#[must_use]
pub fn schema() -> Value {
    let mut properties = Map::new();
    for field in &FIELDS {
        let contexts: Vec<&str> = field.contexts.iter().map(|c| c.as_str()).collect();
        let mut entry = Map::new();
        entry.insert("type".to_string(), json!(field.kind));
        entry.insert("context".to_string(), json!(contexts));
        if field.readonly {
            entry.insert("readonly".to_string(), json!(true));
        }
        properties.insert(field.name.to_string(), Value::Object(entry));
    }

    json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "title": "attachment",
        "type": "object",
        "properties": properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn schema_has_exactly_eighteen_properties() {
        let rendered = schema();
        let properties = rendered["properties"].as_object().unwrap();
        assert_eq!(properties.len(), 18);

        for name in [
            "id",
            "date",
            "modified",
            "guid",
            "link",
            "title",
            "author",
            "comment_status",
            "ping_status",
            "slug",
            "type",
            "post_id",
            "source_url",
            "media_type",
            "media_details",
            "caption",
            "description",
            "alt_text",
        ] {
            assert!(properties.contains_key(name), "missing property: {name}");
        }
    }

    #[test]
    fn field_names_are_unique() {
        let names: HashSet<&str> = FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(names.len(), FIELDS.len());
    }

    #[test]
    fn every_field_visible_in_view_and_edit() {
        for field in &FIELDS {
            assert!(field.visible_in(Context::View), "{} hidden in view", field.name);
            assert!(field.visible_in(Context::Edit), "{} hidden in edit", field.name);
        }
    }

    #[test]
    fn embed_is_a_proper_subset() {
        let embedded = FIELDS.iter().filter(|f| f.visible_in(Context::Embed)).count();
        assert!(embedded > 0);
        assert!(embedded < FIELDS.len());
    }
}
