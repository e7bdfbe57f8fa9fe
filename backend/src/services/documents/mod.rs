//! # Document Service Module
//!
//! Endpoints managing uploaded `.docx` templates.
//!
//! ## Sub-modules:
//! - `upload`: stores a template, parses its placeholders and caches a preview.
//! - `get`: document metadata.
//! - `delete`: removes a document, its dependent rows and its bytes.
//! - `preview`: cached or freshly rendered HTML preview.

mod delete;
mod get;
mod preview;
mod upload;

use actix_web::web::{self, delete, get, post};

/// # Registered Routes:
///
/// *   **`POST /upload`**: multipart body with a `file` part, answers `{documentId}`.
/// *   **`GET /doc/{doc_id}`**: document summary.
/// *   **`DELETE /doc/{doc_id}`**: removes the document, answers `{ok: true}`.
/// *   **`GET /doc/{doc_id}/preview`**: `{html}` preview of the template.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/upload", post().to(upload::process))
        .service(
            web::resource("/doc/{doc_id}")
                .route(get().to(get::process))
                .route(delete().to(delete::process)),
        )
        .route("/doc/{doc_id}/preview", get().to(preview::process));
}
