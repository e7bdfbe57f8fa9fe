use crate::model::answer::AnswerBody;
use serde::{Deserialize, Serialize};

/// Request payload of `POST /api/doc/{id}/answer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAnswerRequest {
    pub body: AnswerBody,
    #[serde(default)]
    pub schema_id: Option<String>,
}

/// Response of `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub document_id: String,
}

/// Preview markup returned by `GET /api/doc/{id}/preview`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub html: String,
}

/// Plain acknowledgement, e.g. for deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
}
