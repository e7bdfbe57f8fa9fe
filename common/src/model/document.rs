use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One placeholder as reported by the document service `/parse` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPlaceholder {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_context: Option<String>,
    /// Literal tokens captured in the document text for this placeholder,
    /// e.g. `[COMPANY NAME]` or `DATE____`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,
}

/// Result of parsing an uploaded template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub document_id: String,
    #[serde(default)]
    pub placeholders: Vec<ParsedPlaceholder>,
}

/// An uploaded template as stored by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    /// Location of the raw bytes in the blob store.
    pub storage_url: String,
    pub mime: String,
    pub size_bytes: u64,
    pub blob_url: Option<String>,
    pub parse_result: Option<ParseResult>,
    pub preview_html: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn placeholder_count(&self) -> usize {
        self.parse_result
            .as_ref()
            .map(|parsed| parsed.placeholders.len())
            .unwrap_or(0)
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            filename: self.filename.clone(),
            mime: self.mime.clone(),
            size_bytes: self.size_bytes,
            placeholder_count: self.placeholder_count(),
            has_preview: self.preview_html.is_some(),
            created_at: self.created_at,
        }
    }
}

/// Metadata returned by `GET /api/doc/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub filename: String,
    pub mime: String,
    pub size_bytes: u64,
    pub placeholder_count: usize,
    pub has_preview: bool,
    pub created_at: DateTime<Utc>,
}
