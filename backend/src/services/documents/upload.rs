//! # Template Upload Service
//!
//! Backs `POST /api/upload`.
//!
//! ## Workflow
//!
//! 1.  **Validation**: the multipart `file` part must carry a `.docx` name, be
//!     non-empty and fit within the configured upload limit. The bytes are
//!     hashed with MD5 while they stream in.
//! 2.  **Blob write**: the bytes land in the blob store as `<id>_<md5>.docx`.
//! 3.  **Parse**: the document service enumerates the placeholders.
//! 4.  **Preview**: an HTML preview is requested; failure here is only logged.
//! 5.  **Persist**: the document row and its placeholder rows are written in
//!     one transaction.
//!
//! Any failure after step 2 removes the blob again through [`UploadSaga`].

use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::blobs::BlobStore;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use common::model::document::Document;
use common::requests::UploadResponse;
use futures_util::StreamExt;
use log::{info, warn};
use md5::Context;
use uuid::Uuid;

const FILE_FIELD: &str = "file";
const DOCX_EXTENSION: &str = ".docx";

/// A validated upload held in memory.
struct Upload {
    filename: String,
    bytes: Vec<u8>,
    md5_hex: String,
}

/// Compensation for a blob written before the database commit.
///
/// Dropping an uncompleted saga deletes the blob; completing it keeps the blob.
struct UploadSaga<'a> {
    blobs: &'a BlobStore,
    location: Option<String>,
}

impl<'a> UploadSaga<'a> {
    fn new(blobs: &'a BlobStore, location: String) -> Self {
        Self {
            blobs,
            location: Some(location),
        }
    }

    fn complete(mut self) {
        self.location = None;
    }

    fn compensate(&mut self) {
        if let Some(location) = self.location.take() {
            match self.blobs.remove(&location) {
                Ok(()) => warn!("removed blob {} of failed upload", location),
                Err(err) => warn!("could not remove blob {} of failed upload: {}", location, err),
            }
        }
    }
}

impl Drop for UploadSaga<'_> {
    fn drop(&mut self) {
        self.compensate();
    }
}

fn bad_multipart(err: impl std::fmt::Display) -> ApiError {
    ApiError::BadRequest(format!("invalid multipart body: {}", err))
}

/// Reads the `file` part of the request, skipping any other part.
async fn read_upload(mut payload: Multipart, max_bytes: usize) -> Result<Upload, ApiError> {
    let mut upload = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(bad_multipart)?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        if name.as_deref() != Some(FILE_FIELD) {
            while let Some(chunk) = field.next().await {
                chunk.map_err(bad_multipart)?;
            }
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        if !filename.to_lowercase().ends_with(DOCX_EXTENSION) {
            return Err(ApiError::BadRequest("only .docx files are accepted".into()));
        }

        let mut md5_hasher = Context::new();
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(bad_multipart)?;
            if bytes.len() + chunk.len() > max_bytes {
                return Err(ApiError::BadRequest(format!(
                    "file exceeds the {} byte upload limit",
                    max_bytes
                )));
            }
            md5_hasher.consume(&chunk);
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("uploaded file is empty".into()));
        }

        upload = Some(Upload {
            filename,
            bytes,
            md5_hex: format!("{:x}", md5_hasher.finalize()),
        });
    }

    upload.ok_or_else(|| ApiError::BadRequest("missing file field".into()))
}

/// Stores, parses and records an upload, returning the new document id.
async fn persist_upload(state: &AppState, upload: Upload) -> Result<String, ApiError> {
    let document_id = Uuid::new_v4().to_string();
    let blobs = state.storage.blobs();
    let location = blobs.write(&document_id, &upload.md5_hex, &upload.bytes)?;
    let saga = UploadSaga::new(blobs, location.clone());

    let parse_result = state
        .doc_service
        .parse(&upload.filename, &upload.bytes)
        .await?;

    let preview_html = match state.doc_service.to_html(&upload.filename, &upload.bytes).await {
        Ok(html) => Some(html),
        Err(err) => {
            warn!("preview of {} skipped at upload: {}", upload.filename, err);
            None
        }
    };

    let document = Document {
        id: document_id.clone(),
        mime: mime_guess::from_path(&upload.filename)
            .first_or_octet_stream()
            .to_string(),
        filename: upload.filename,
        storage_url: location,
        size_bytes: upload.bytes.len() as u64,
        blob_url: None,
        parse_result: Some(parse_result),
        preview_html,
        created_at: Utc::now(),
    };
    state.storage.insert_document(&document)?;
    saga.complete();

    info!(
        "stored document {} ({}, {} placeholders)",
        document.id,
        document.filename,
        document.placeholder_count()
    );
    Ok(document_id)
}

pub async fn process(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let upload = read_upload(payload, state.max_upload_bytes).await?;
    let document_id = persist_upload(&state, upload).await?;
    Ok(HttpResponse::Ok().json(UploadResponse { document_id }))
}
