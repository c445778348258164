//! Error types for the HTTP surface and server startup.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dishboard_config::ConfigError;
use dishboard_core::{DishboardCoreError, ErrorKind, StoreError};
use dishboard_protocol::ErrorResponse;
use log::error;
use thiserror::Error;

/// Errors rendered into the uniform failure envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Mutation or list failure from the core service.
    #[error(transparent)]
    Core(#[from] DishboardCoreError),
    /// The request body could not be decoded.
    #[error("{0}")]
    BadRequest(String),
    /// No route matched the request.
    #[error("Route not found")]
    RouteNotFound,
    /// A browser from a foreign origin tried to open the real-time channel.
    #[error("Origin not allowed")]
    OriginRejected,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(err) => match err.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::OriginRejected => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Core(err @ DishboardCoreError::Store(source)) => {
                error!("store failure (error={})", source);
                ErrorResponse::new(err.to_string()).with_error(source.to_string())
            }
            other => ErrorResponse::new(other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// Errors raised while assembling or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("seed error: {0}")]
    Seed(#[from] DishboardCoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid allowed origin: {0}")]
    InvalidOrigin(String),
}
