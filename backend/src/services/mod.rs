//! # API Services
//!
//! Aggregates every `/api` endpoint. Each area module registers its routes on
//! the shared scope and keeps one handler per file.
//!
//! ## Areas:
//! - `documents`: upload, metadata, deletion and preview of templates.
//! - `schemas`: retrieval and create-once generation of the form schema.
//! - `answers`: retrieval and upsert of the submitted answer set.
//! - `render`: mapping computation and filled document download.
//! - `health`: liveness probe.

mod answers;
mod documents;
mod health;
mod render;
mod schemas;

use crate::error::ApiError;
use actix_web::web::{self, get, scope};
use actix_web::Scope;

/// The base path for all gateway endpoints.
const API_PATH: &str = "/api";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/health", get().to(health::process))
        .configure(documents::configure_routes)
        .configure(schemas::configure_routes)
        .configure(answers::configure_routes)
        .configure(render::configure_routes)
}

/// JSON extractor settings; malformed bodies answer with the error envelope.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}
