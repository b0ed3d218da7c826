use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;

use crate::domains::contact::service::ContactServiceError;

pub const GENERIC_CONFIGURATION_ERROR: &str = "Server not configured";

#[derive(Debug)]
pub struct AppError {
  pub status_code: StatusCode,
  pub message: String,
}

impl AppError {
  pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
    Self {
      status_code,
      message: message.into(),
    }
  }

  pub fn bad_request(message: impl Into<String>) -> Self {
    Self::new(StatusCode::BAD_REQUEST, message)
  }

  pub fn internal_server_error(message: impl Into<String>) -> Self {
    Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let body = Json(json!({
      "ok": false,
      "error": self.message,
    }));

    (self.status_code, body).into_response()
  }
}

impl From<AppError> for StatusCode {
  fn from(err: AppError) -> Self {
    err.status_code
  }
}

impl From<serde_json::Error> for AppError {
  fn from(error: serde_json::Error) -> Self {
    tracing::warn!("JSON error: {:?}", error);
    AppError::bad_request("Invalid JSON format")
  }
}

impl From<ContactServiceError> for AppError {
  fn from(error: ContactServiceError) -> Self {
    match error {
      ContactServiceError::ValidationError(msg) => AppError::bad_request(msg),
      ContactServiceError::AbuseCheckError(reason) => AppError::bad_request(reason),
      ContactServiceError::ConfigurationError(detail) => {
        tracing::error!("Contact relay misconfigured: {}", detail);
        AppError::internal_server_error(GENERIC_CONFIGURATION_ERROR)
      }
      ContactServiceError::SendError(hint) => AppError::internal_server_error(hint),
    }
  }
}
