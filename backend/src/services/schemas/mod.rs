//! # Schema Service Module
//!
//! - `get`: the stored schema of a document.
//! - `create`: generates the schema through the document service, once per document.

mod create;
mod get;

use actix_web::web::{self, get, post};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/doc/{doc_id}/schema")
            .route(get().to(get::process))
            .route(post().to(create::process)),
    );
}
