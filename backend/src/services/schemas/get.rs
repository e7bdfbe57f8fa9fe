use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

/// `GET /api/doc/{doc_id}/schema`: schema body with its `_meta` block.
pub async fn process(
    state: web::Data<AppState>,
    doc_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let schema = state
        .storage
        .latest_schema(&doc_id)?
        .ok_or(ApiError::SchemaNotFound)?;
    Ok(HttpResponse::Ok().json(schema))
}
