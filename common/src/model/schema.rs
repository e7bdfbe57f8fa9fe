use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input widget kind for a form field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Date,
    Number,
    Multiline,
    Select,
    Phone,
}

fn required_by_default() -> bool {
    true
}

/// A single form field of a generated schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default = "required_by_default")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Stable id shared by fields that fan out to several occurrences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_group: Option<String>,
    /// Placeholder keys or literal tokens this field fills.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,
}

/// An ordered, titled collection of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// The grouped form definition generated for a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Schema {
    /// All fields in schema order: groups in order, fields in order within each group.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.groups.iter().flat_map(|group| group.fields.iter())
    }
}

/// Persistence metadata attached to a stored schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMeta {
    pub id: String,
    pub doc_id: String,
    pub model_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A schema as returned by the gateway: the schema body plus a `_meta` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSchema {
    #[serde(flatten)]
    pub schema: Schema,
    #[serde(rename = "_meta")]
    pub meta: SchemaMeta,
}
