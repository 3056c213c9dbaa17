//! Error type for `campus-session`.

use campus_core::store::WriteFailure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The store refused to open a subscription.
  #[error("subscription failed: {0}")]
  Subscribe(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The store rejected an update, delete or category write.
  #[error("write-back failed: {source}")]
  WriteBack {
    kind:   WriteFailure,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
