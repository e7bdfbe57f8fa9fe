use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::requests::PreviewResponse;
use log::debug;

/// `GET /api/doc/{doc_id}/preview`: the cached preview, rendered and cached on
/// first request when the upload could not produce one.
pub async fn process(
    state: web::Data<AppState>,
    doc_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let html = preview_html(&state, &doc_id).await?;
    Ok(HttpResponse::Ok().json(PreviewResponse { html }))
}

async fn preview_html(state: &AppState, doc_id: &str) -> Result<String, ApiError> {
    let document = state
        .storage
        .get_document(doc_id)?
        .ok_or(ApiError::DocumentNotFound)?;
    if let Some(html) = document.preview_html {
        return Ok(html);
    }

    let bytes = state
        .storage
        .blobs()
        .read(&document.storage_url)?
        .ok_or(ApiError::DocBytesMissing)?;
    let html = state.doc_service.to_html(&document.filename, &bytes).await?;
    state.storage.cache_preview(doc_id, &html)?;
    debug!("cached preview of document {}", doc_id);
    Ok(html)
}
