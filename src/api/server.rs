// API server implementation
// Author: Gabriel Demetrios Lafis

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use log::info;

use crate::data::IngestOptions;
use crate::storage::DataStorage;
use crate::utils::ServerConfig;
use super::routes;

/// Shared state handed to every handler
pub struct AppState {
    pub storage: Arc<dyn DataStorage + Send + Sync>,
    pub ingest: IngestOptions,
}

impl AppState {
    pub fn new(storage: Arc<dyn DataStorage + Send + Sync>, ingest: IngestOptions) -> Self {
        AppState { storage, ingest }
    }
}

/// API server
pub struct Server {
    config: ServerConfig,
    state: web::Data<AppState>,
}

impl Server {
    /// Create a new API server
    pub fn new(state: AppState, config: ServerConfig) -> Self {
        Server {
            config,
            state: web::Data::new(state),
        }
    }

    /// Run the API server
    pub async fn run(&self) -> std::io::Result<()> {
        let state = self.state.clone();
        let enable_cors = self.config.enable_cors;

        info!(
            "Starting server at http://{}:{}",
            self.config.host, self.config.port
        );

        HttpServer::new(move || {
            let cors = if enable_cors {
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600)
            } else {
                Cors::default()
            };

            App::new()
                .app_data(state.clone())
                .wrap(cors)
                .configure(routes::configure)
        })
        .workers(self.config.worker_count())
        .bind((self.config.host.as_str(), self.config.port))?
        .run()
        .await
    }
}
