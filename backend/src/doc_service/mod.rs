//! Port to the document microservice that parses, previews, schematises and
//! renders `.docx` templates.
//!
//! Handlers only see [`DocumentProcessor`]; [`http::HttpDocService`] is the
//! production adapter.

pub mod http;

use crate::error::truncate_detail;
use crate::mapping::Mapping;
use async_trait::async_trait;
use common::model::document::{ParseResult, ParsedPlaceholder};
use common::model::schema::Schema;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocServiceError {
    #[error("doc-service error ({status}): {detail}")]
    Status { status: u16, detail: String },
    #[error("doc-service unreachable: {0}")]
    Unreachable(String),
    #[error("doc-service returned an invalid payload: {0}")]
    Decode(String),
}

impl DocServiceError {
    /// Short classification sent to clients as the `error` field.
    pub fn classification(&self) -> String {
        match self {
            DocServiceError::Status { status, .. } => format!("doc-service error ({status})"),
            DocServiceError::Unreachable(_) => "doc-service unreachable".to_string(),
            DocServiceError::Decode(_) => "doc-service invalid response".to_string(),
        }
    }

    pub fn detail(&self) -> Option<String> {
        let detail = match self {
            DocServiceError::Status { detail, .. } => detail,
            DocServiceError::Unreachable(reason) | DocServiceError::Decode(reason) => reason,
        };
        if detail.trim().is_empty() {
            None
        } else {
            Some(truncate_detail(detail))
        }
    }

    /// Whether another attempt could succeed: transport failures and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            DocServiceError::Status { status, .. } => *status >= 500,
            DocServiceError::Unreachable(_) => true,
            DocServiceError::Decode(_) => false,
        }
    }
}

/// Schema produced by the document service, with the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedSchema {
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(flatten)]
    pub schema: Schema,
}

/// A filled document returned by the render operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
}

#[async_trait]
pub trait DocumentProcessor: Send + Sync {
    /// Enumerates the placeholders of a template.
    async fn parse(&self, filename: &str, bytes: &[u8]) -> Result<ParseResult, DocServiceError>;

    /// Renders a template to preview HTML.
    async fn to_html(&self, filename: &str, bytes: &[u8]) -> Result<String, DocServiceError>;

    /// Infers a grouped field schema from parsed placeholders.
    async fn generate_schema(
        &self,
        placeholders: &[ParsedPlaceholder],
    ) -> Result<GeneratedSchema, DocServiceError>;

    /// Substitutes every mapped token in the template bytes.
    async fn render(
        &self,
        filename: &str,
        bytes: &[u8],
        mapping: &Mapping,
    ) -> Result<RenderedDocument, DocServiceError>;
}
