//! Campus monitor server.
//!
//! Wires an in-memory asset store, seeded from a JSON export, to a derivation
//! session and serves the session's view under `/api`.

pub mod error;

pub use error::{Error, Result};

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use campus_core::{store::AssetStore, time::Clock};
use campus_session::{SessionClient, SessionConfig};
use campus_store_memory::MemoryStore;
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CAMPUS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
  pub host:      String,
  pub port:      u16,
  /// JSON export (`{"assets": ..., "categories": [...]}`) to seed the store.
  #[serde(default)]
  pub seed_path: Option<PathBuf>,
  #[serde(default)]
  pub session:   SessionConfig,
}

/// Read configuration from `path` (optional) layered under the environment.
///
/// Nested keys use `__`, e.g. `CAMPUS_SESSION__HEARTBEAT_MS=500`.
pub fn load_config(path: &Path) -> Result<MonitorConfig> {
  build_config(config::File::from(path).required(false))
}

fn build_config<F>(file: F) -> Result<MonitorConfig>
where
  F: config::Source + Send + Sync + 'static,
{
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080)?
    .add_source(file)
    .add_source(
      config::Environment::with_prefix("CAMPUS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()?;
  Ok(settings.try_deserialize()?)
}

// ─── Store ────────────────────────────────────────────────────────────────────

/// Open the in-memory store, loading `seed_path` when given.
pub async fn open_store(
  seed_path: Option<&Path>,
  clock: Arc<dyn Clock>,
) -> Result<MemoryStore> {
  let Some(path) = seed_path else {
    tracing::info!("no seed file configured, starting with an empty store");
    return Ok(MemoryStore::with_clock(clock));
  };

  let path = expand_tilde(path);
  let text = tokio::fs::read_to_string(&path)
    .await
    .map_err(|source| Error::Seed { path: path.clone(), source })?;
  let store = MemoryStore::load(&text, clock)?;
  tracing::info!(path = %path.display(), "seeded store");
  Ok(store)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level router with the API nested under `/api`.
pub fn router<S>(client: SessionClient<S>) -> Router
where
  S: AssetStore + 'static,
{
  Router::new().nest("/api", campus_api::api_router(client))
}
