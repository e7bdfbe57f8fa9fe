mod config;
mod doc_service;
mod error;
mod mapping;
mod services;
mod state;
mod storage;

#[cfg(test)]
mod test_support;

use crate::config::Config;
use crate::doc_service::http::{HttpDocService, RetryPolicy};
use crate::state::AppState;
use crate::storage::Storage;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    // Optional path to a TOML file overriding the built-in defaults.
    let config_path = env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).map_err(io::Error::other)?;
    let storage = Storage::open(&config.storage.database_path, &config.storage.blob_dir)
        .map_err(io::Error::other)?;
    let doc_service = HttpDocService::new(
        config.doc_service.base_url.clone(),
        RetryPolicy::from_config(&config.doc_service),
    )
    .map_err(io::Error::other)?;

    let state = AppState {
        storage,
        doc_service: Arc::new(doc_service),
        max_upload_bytes: config.storage.max_upload_bytes,
    };
    let json_limit = config.server.json_limit_bytes;

    info!(
        "api-gw listening on http://{}:{} (doc-service at {})",
        config.server.host, config.server.port, config.doc_service.base_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(services::json_config(json_limit))
            .app_data(web::Data::new(state.clone()))
            .service(services::configure_routes())
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
