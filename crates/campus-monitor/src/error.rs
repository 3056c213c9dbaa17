//! Startup errors for the monitor binary.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("failed to read seed file {path:?}: {source}")]
  Seed {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("store error: {0}")]
  Store(#[from] campus_store_memory::error::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
