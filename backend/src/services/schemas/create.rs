//! # Schema Creation Service
//!
//! Backs `POST /api/doc/{doc_id}/schema`. A document gets at most one schema:
//! an existing schema is returned as is, otherwise the document service infers
//! one from the parsed placeholders and it is stored unless a concurrent request
//! stored one first. Every caller observes the same schema id.

use crate::error::ApiError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::schema::StoredSchema;
use log::info;

pub async fn process(
    state: web::Data<AppState>,
    doc_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let (schema, created) = create_schema(&state, &doc_id).await?;
    let mut response = if created {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(response.json(schema))
}

/// Returns the document's schema and whether this call created it.
async fn create_schema(state: &AppState, doc_id: &str) -> Result<(StoredSchema, bool), ApiError> {
    let document = state
        .storage
        .get_document(doc_id)?
        .ok_or(ApiError::DocumentNotFound)?;
    if let Some(existing) = state.storage.latest_schema(doc_id)? {
        info!("reusing schema {} for document {}", existing.meta.id, doc_id);
        return Ok((existing, false));
    }

    let placeholders = document
        .parse_result
        .as_ref()
        .map(|parsed| parsed.placeholders.as_slice())
        .unwrap_or_default();
    let generated = state.doc_service.generate_schema(placeholders).await?;

    let (stored, created) = state.storage.insert_schema_if_absent(
        doc_id,
        generated.model_name.as_deref(),
        &generated.schema,
    )?;
    if created {
        info!(
            "created schema {} for document {} with {} fields",
            stored.meta.id,
            doc_id,
            stored.schema.fields().count()
        );
    }
    Ok((stored, created))
}
