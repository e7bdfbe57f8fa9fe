//! # Answer Service Module
//!
//! - `get`: the current answer set of a document.
//! - `save`: creates or replaces the answer set.

mod get;
mod save;

use actix_web::web::{self, get, post};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/doc/{doc_id}/answer")
            .route(get().to(get::process))
            .route(post().to(save::process)),
    );
}
