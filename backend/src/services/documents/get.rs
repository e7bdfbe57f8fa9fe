use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

/// `GET /api/doc/{doc_id}`: the document summary.
pub async fn process(
    state: web::Data<AppState>,
    doc_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let document = state
        .storage
        .get_document(&doc_id)?
        .ok_or(ApiError::DocumentNotFound)?;
    Ok(HttpResponse::Ok().json(document.summary()))
}
