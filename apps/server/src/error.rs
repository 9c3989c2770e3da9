use std::io::Error as IoError;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use fleetwatch::FleetError;
use fleetwatch::config::ConfigError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Start-up failures
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Address parsing error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Handler failures, rendered as `{error}` JSON
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Fleet(#[from] FleetError),
    #[error("{0}")]
    Validation(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Fleet(FleetError::UnknownDevice(_)) => StatusCode::NOT_FOUND,
            ApiError::Fleet(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Fleet(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        HttpResponse::build(status).json(json!({ "error": self.to_string() }))
    }
}
