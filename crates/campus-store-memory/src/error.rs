//! Error type for `campus-store-memory`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] campus_core::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// The store only accepts reads (viewer access).
  #[error("permission denied")]
  PermissionDenied,

  #[error("asset not found: {0}")]
  AssetNotFound(String),

  /// The patch tried to rewrite a field the store owns.
  #[error("field {0:?} cannot be patched")]
  ImmutableField(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
