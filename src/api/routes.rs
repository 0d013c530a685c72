// API routes configuration
// Author: Gabriel Demetrios Lafis

use actix_web::{web, HttpResponse, Responder};

use super::handlers;

/// Configure API routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            // Health check
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/datasets")
                    .route("", web::get().to(handlers::list_datasets))
                    .route("", web::post().to(handlers::create_dataset))
                    .route("/{name}", web::get().to(handlers::get_dataset))
                    .route("/{name}", web::delete().to(handlers::delete_dataset))
                    .route("/{name}/stats", web::get().to(handlers::dataset_stats))
                    .route(
                        "/{name}/fields/{field}/unique",
                        web::get().to(handlers::field_unique_values),
                    )
                    .route(
                        "/{name}/fields/{field}/numeric",
                        web::get().to(handlers::field_numeric_stats),
                    )
                    .route("/{name}/query", web::post().to(handlers::query_dataset))
                    .route("/{name}/aggregate", web::post().to(handlers::aggregate_dataset))
                    .route("/{name}/groups", web::post().to(handlers::group_dataset)),
            ),
    );
}

/// Health check handler
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
