//! Response models
//!
//! List and get endpoints return objects whose fields become table columns
//! almost one to one, so those stay as loosely typed [`Resource`] values.
//! The hand-built endpoints decode into small typed structs; unknown fields
//! are ignored.

use crate::types::{JsonObject, JsonValue, Row};
use serde::{Deserialize, Serialize};

/// A PagerDuty object with every field as returned
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Resource {
    fields: JsonObject,
}

impl Resource {
    /// Wrap a decoded object
    pub fn new(fields: JsonObject) -> Self {
        Self { fields }
    }

    /// The object's id, empty for id-less objects such as on-call entries
    pub fn id(&self) -> &str {
        self.str_field("id").unwrap_or_default()
    }

    /// Field by dotted path, e.g. `user.email`
    pub fn field(&self, path: &str) -> Option<&JsonValue> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        parts.try_fold(self.fields.get(first)?, |value, part| value.get(part))
    }

    /// String field by dotted path
    pub fn str_field(&self, path: &str) -> Option<&str> {
        self.field(path).and_then(JsonValue::as_str)
    }

    /// Set a top-level field
    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) {
        self.fields.insert(key.into(), value);
    }

    /// Every field, as one row
    pub fn into_row(self) -> Row {
        self.fields
    }
}

/// Minimal reference to another object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObjectReference {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// One custom field value on an incident
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CustomFieldValue {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub value: JsonValue,
}

/// A business service impacted by an incident
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BusinessServiceImpact {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// An edge in the service dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Relationship {
    pub id: String,
    pub supporting_service: ObjectReference,
    pub dependent_service: ObjectReference,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CustomFieldsResponse {
    #[serde(default)]
    pub(crate) custom_fields: Vec<CustomFieldValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImpactsResponse {
    #[serde(default)]
    pub(crate) services: Vec<BusinessServiceImpact>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelationshipsResponse {
    #[serde(default)]
    pub(crate) relationships: Vec<Relationship>,
}

/// Offset-paginated list envelope; the item array sits under a per-endpoint key
#[derive(Debug, Deserialize)]
pub(crate) struct ListEnvelope {
    #[serde(default)]
    pub(crate) limit: Option<u32>,
    #[serde(default)]
    pub(crate) offset: Option<u32>,
    #[serde(default)]
    pub(crate) more: Option<bool>,
    #[serde(flatten)]
    pub(crate) rest: JsonObject,
}
