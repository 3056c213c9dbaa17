//! Error types for `campus-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The root of an asset export was neither an object, an array nor null.
  #[error("unexpected {0} where an asset collection was expected")]
  UnexpectedShape(&'static str),

  #[error("patch must be a JSON object, got {0}")]
  InvalidPatch(&'static str),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
  match value {
    serde_json::Value::Null => "null",
    serde_json::Value::Bool(_) => "boolean",
    serde_json::Value::Number(_) => "number",
    serde_json::Value::String(_) => "string",
    serde_json::Value::Array(_) => "array",
    serde_json::Value::Object(_) => "object",
  }
}
