//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every application-level failure leaves the server as the same structured
//! body: `{"timestamp": <RFC 3339>, "message": <string>}`. Services raise
//! [`parley_core::Error`]; this module owns the single mapping from error
//! kind to HTTP status.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// The stable error body shape.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
  pub timestamp: String,
  pub message:   String,
}

impl ErrorDetails {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      timestamp: chrono::Utc::now().to_rfc3339(),
      message:   message.into(),
    }
  }
}

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Internal(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<parley_core::Error> for ApiError {
  fn from(e: parley_core::Error) -> Self {
    use parley_core::Error;
    match &e {
      Error::PersonNotFoundById(_)
      | Error::PersonNotFoundByName(_)
      | Error::NoPeopleFound
      | Error::MessageNotFoundById(_)
      | Error::NoMessagesFound => ApiError::NotFound(e.to_string()),

      Error::WrongPassword
      | Error::IncorrectCredentials
      | Error::Validation(_)
      | Error::Duplicate(_) => ApiError::BadRequest(e.to_string()),

      Error::NotMessageSender { .. } => ApiError::Forbidden(e.to_string()),

      // Never a backtrace, only the error's string form.
      Error::Store(_) => ApiError::Internal(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    (status, Json(ErrorDetails::new(self.to_string()))).into_response()
  }
}
