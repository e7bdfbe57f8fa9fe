use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single submitted value. Only scalars are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl AnswerValue {
    /// Text substituted into the document, `None` for a null value.
    pub fn fill_text(&self) -> Option<String> {
        match self {
            AnswerValue::Null => None,
            AnswerValue::Bool(value) => Some(value.to_string()),
            AnswerValue::Number(value) => Some(value.to_string()),
            AnswerValue::Text(value) => Some(value.clone()),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

/// Submitted values keyed by schema field key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerBody(BTreeMap<String, AnswerValue>);

impl AnswerBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>, V: Into<AnswerValue>> FromIterator<(K, V)> for AnswerBody {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// The single current answer row of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnswer {
    pub id: String,
    pub doc_id: String,
    pub schema_id: Option<String>,
    pub body: AnswerBody,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response of `GET /api/doc/{id}/answer`; only `body` is present when
/// nothing has been submitted yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<String>,
    pub body: AnswerBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<StoredAnswer> for AnswerView {
    fn from(answer: StoredAnswer) -> Self {
        Self {
            id: Some(answer.id),
            doc_id: Some(answer.doc_id),
            schema_id: answer.schema_id,
            body: answer.body,
            created_at: Some(answer.created_at),
            updated_at: Some(answer.updated_at),
        }
    }
}
