//! # Render Service Module
//!
//! - `start`: resolves the token mapping and returns the filled document.

mod start;

use actix_web::web::{self, post};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/doc/{doc_id}/render", post().to(start::process));
}
