//! Application state shared by every handler.

use crate::doc_service::DocumentProcessor;
use crate::storage::Storage;
use std::sync::Arc;

/// Injected into the Actix application as `web::Data` in `main.rs`.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    /// The document microservice, behind its port so tests can substitute it.
    pub doc_service: Arc<dyn DocumentProcessor>,
    /// Largest accepted template upload.
    pub max_upload_bytes: usize,
}
