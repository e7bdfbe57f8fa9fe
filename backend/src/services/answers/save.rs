//! # Answer Save Service
//!
//! Backs `POST /api/doc/{doc_id}/answer` with a `{body, schema_id?}` payload.
//! Each document keeps one answer row: the first submission creates it and
//! later ones replace its body. Omitting `schema_id` keeps the schema the row
//! already references.

use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::answer::StoredAnswer;
use common::requests::SaveAnswerRequest;
use log::info;

pub async fn process(
    state: web::Data<AppState>,
    doc_id: web::Path<String>,
    request: web::Json<SaveAnswerRequest>,
) -> Result<HttpResponse, ApiError> {
    let answer = save_answer(&state, &doc_id, request.into_inner())?;
    Ok(HttpResponse::Ok().json(answer))
}

fn save_answer(
    state: &AppState,
    doc_id: &str,
    request: SaveAnswerRequest,
) -> Result<StoredAnswer, ApiError> {
    if !state.storage.document_exists(doc_id)? {
        return Err(ApiError::DocumentNotFound);
    }
    if let Some(schema_id) = request.schema_id.as_deref() {
        if !state.storage.schema_belongs_to(doc_id, schema_id)? {
            return Err(ApiError::BadRequest(format!(
                "schema {} does not belong to document {}",
                schema_id, doc_id
            )));
        }
    }

    let answer = state
        .storage
        .upsert_answer(doc_id, &request.body, request.schema_id.as_deref())?;
    info!("saved {} answers for document {}", answer.body.len(), doc_id);
    Ok(answer)
}
