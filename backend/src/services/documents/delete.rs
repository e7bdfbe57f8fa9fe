//! # Document Deletion Service
//!
//! Backs `DELETE /api/doc/{doc_id}`. The row is removed under the database
//! write lock first; the blob is unlinked only once that transaction has
//! committed, so an aborted delete never loses bytes.

use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::Storage;
use actix_web::{web, HttpResponse};
use common::requests::OkResponse;
use log::{info, warn};

pub async fn process(
    state: web::Data<AppState>,
    doc_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let storage = state.storage.clone();
    let doc_id = doc_id.into_inner();
    // The delete waits on the SQLite write lock, so it runs on the blocking pool.
    web::block(move || delete_document(&storage, &doc_id)).await??;
    Ok(HttpResponse::Ok().json(OkResponse { ok: true }))
}

fn delete_document(storage: &Storage, doc_id: &str) -> Result<(), ApiError> {
    let Some(location) = storage.delete_document(doc_id)? else {
        info!("delete of unknown document {} ignored", doc_id);
        return Ok(());
    };

    if let Err(err) = storage.blobs().remove(&location) {
        warn!("document {} deleted but blob {} remains: {}", doc_id, location, err);
    }
    info!("deleted document {}", doc_id);
    Ok(())
}
