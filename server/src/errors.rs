// slicehouse_server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{error::JsonPayloadError, HttpRequest, HttpResponse, ResponseError};
use serde_json::json;
use slicehouse::OrderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  /// Malformed request shape: bad JSON, bad header, bad path parameter.
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error(transparent)]
  Order(#[from] OrderError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Order(err) => order_status(err),
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migrate(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::info!(status = status.as_u16(), application_error = %self, "Request rejected");
    }
    let body = match self {
      AppError::Validation(m) | AppError::Forbidden(m) | AppError::NotFound(m) => json!({ "error": m }),
      AppError::Order(err) if err.is_client_error() => json!({ "error": err.to_string() }),
      // Internals stay in the log.
      AppError::Order(_) | AppError::Sqlx(_) | AppError::Migrate(_) | AppError::Internal(_) => {
        json!({ "error": "An internal error occurred" })
      }
      AppError::Config(m) => json!({ "error": "Configuration issue", "detail": m }),
    };
    HttpResponse::build(status).json(body)
  }
}

fn order_status(err: &OrderError) -> StatusCode {
  match err {
    OrderError::Forbidden(_) => StatusCode::FORBIDDEN,
    OrderError::OrderNotFound(_) | OrderError::ItemNotFound { .. } => StatusCode::NOT_FOUND,
    OrderError::InvalidTransition { .. } | OrderError::StatusConflict(_) => StatusCode::CONFLICT,
    OrderError::Pipeline(_) | OrderError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    _ => StatusCode::BAD_REQUEST,
  }
}

/// Turns body deserialization failures into the same `{ "error": ... }` shape
/// as every other 400, with serde's field detail.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  let detail = match &err {
    JsonPayloadError::Deserialize(e) => e.to_string(),
    other => other.to_string(),
  };
  AppError::Validation(format!("Invalid request body: {}", detail)).into()
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
