mod errors;
mod params;
mod services;

use std::sync::Arc;
use actix_web::{middleware, web, App, HttpServer};
use blob_store::LocalFileBlobStore;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use crate::params::Args;
use crate::services::{AppState, MAX_UPLOAD_BYTES};


#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store = LocalFileBlobStore::open(&args.upload_dir).map_err(|e| {
        tracing::error!(upload_dir = %args.upload_dir.display(), error = ?e, "failed to open upload directory");
        std::io::Error::other(e)
    })?;

    let shared_state = web::Data::new(AppState::new(Arc::new(store), MAX_UPLOAD_BYTES));

    tracing::info!(upload_dir = %args.upload_dir.display(), "Server running on http://{}:{}", args.host, args.port);
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(shared_state.clone())
            .configure(services::configure)
    })
    .bind((args.host.as_str(), args.port))?
    .run()
    .await
}
