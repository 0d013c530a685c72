// API module for exposing functionality via HTTP
// Author: Gabriel Demetrios Lafis

mod handlers;
mod models;
mod routes;
mod server;

pub use handlers::*;
pub use models::*;
pub use routes::*;
pub use server::*;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::data::DataError;
use crate::processing::ProcessingError;
use crate::storage::StorageError;

/// Represents an error in the API module
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Data error: {0}")]
    DataError(#[from] DataError),
    #[error("Processing error: {0}")]
    ProcessingError(#[from] ProcessingError),
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::DataError(DataError::IoError(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::DataError(_) => StatusCode::BAD_REQUEST,
            ApiError::ProcessingError(_) => StatusCode::BAD_REQUEST,
            ApiError::StorageError(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::StorageError(StorageError::AlreadyExists(_)) => StatusCode::CONFLICT,
            ApiError::StorageError(StorageError::Other(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string(),
        }))
    }
}
