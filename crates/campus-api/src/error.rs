//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use campus_core::store::WriteFailure;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The store rejected or failed a write-back. The status follows the
  /// store's classification of the failure.
  #[error(transparent)]
  Session(#[from] campus_session::Error),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Session(e) => (session_status(e), e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

fn session_status(error: &campus_session::Error) -> StatusCode {
  match error {
    campus_session::Error::WriteBack { kind, .. } => match kind {
      WriteFailure::NotFound => StatusCode::NOT_FOUND,
      WriteFailure::PermissionDenied => StatusCode::FORBIDDEN,
      WriteFailure::Invalid => StatusCode::BAD_REQUEST,
      WriteFailure::Unavailable => StatusCode::BAD_GATEWAY,
    },
    campus_session::Error::Subscribe(_) => StatusCode::BAD_GATEWAY,
  }
}
