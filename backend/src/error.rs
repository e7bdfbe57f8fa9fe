//! HTTP-facing error taxonomy.
//!
//! Every failure leaves the gateway as JSON `{ "error": <string>, ...context }`.
//! Internal details (SQL errors, IO errors) are logged, never sent.

use crate::doc_service::DocServiceError;
use crate::storage::StorageError;
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Longest diagnostic detail forwarded to a client.
pub const MAX_DETAIL_CHARS: usize = 500;

/// A prerequisite that must exist before a document can be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Prerequisite {
    Schema,
    Answers,
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prerequisite::Schema => write!(f, "schema"),
            Prerequisite::Answers => write!(f, "answers"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("document not found")]
    DocumentNotFound,
    #[error("schema not found")]
    SchemaNotFound,
    #[error("render prerequisites missing: {0:?}")]
    Incomplete(Vec<Prerequisite>),
    #[error(transparent)]
    DocService(#[from] DocServiceError),
    #[error("render failed: {0}")]
    RenderFailed(String),
    #[error("document bytes missing")]
    DocBytesMissing,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage(StorageError::Io(err))
    }
}

impl From<BlockingError> for ApiError {
    fn from(err: BlockingError) -> Self {
        ApiError::Storage(StorageError::Io(std::io::Error::other(err)))
    }
}

/// Cuts `detail` down to [`MAX_DETAIL_CHARS`] characters.
pub fn truncate_detail(detail: &str) -> String {
    detail.chars().take(MAX_DETAIL_CHARS).collect()
}

impl ApiError {
    fn body(&self) -> Value {
        match self {
            ApiError::BadRequest(message) => json!({ "error": message }),
            ApiError::DocumentNotFound => json!({ "error": "not_found" }),
            ApiError::SchemaNotFound => json!({ "error": "not_found", "not_found": true }),
            ApiError::Incomplete(needs) => json!({ "error": "incomplete", "needs": needs }),
            ApiError::DocService(err) => match err.detail() {
                Some(detail) => json!({ "error": err.classification(), "detail": detail }),
                None => json!({ "error": err.classification() }),
            },
            ApiError::RenderFailed(detail) => {
                json!({ "error": "render_failed", "detail": truncate_detail(detail) })
            }
            ApiError::DocBytesMissing => json!({ "error": "doc_bytes_missing" }),
            ApiError::Storage(_) => json!({ "error": "storage_error" }),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::DocumentNotFound | ApiError::SchemaNotFound => StatusCode::NOT_FOUND,
            ApiError::Incomplete(_) => StatusCode::CONFLICT,
            ApiError::DocService(_) | ApiError::RenderFailed(_) => StatusCode::BAD_GATEWAY,
            ApiError::DocBytesMissing | ApiError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Storage(err) = self {
            log::error!("storage failure: {}", err);
        }
        HttpResponse::build(self.status_code()).json(self.body())
    }
}
