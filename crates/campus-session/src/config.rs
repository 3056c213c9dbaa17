//! Session configuration.

use std::time::Duration;

use campus_core::{asset::DEFAULT_CATEGORIES, history::MAX_HISTORY_POINTS};
use serde::Deserialize;

/// Tunables for a [`Session`](crate::Session); every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
  /// Aggregate heartbeat period in milliseconds.
  pub heartbeat_ms:       u64,
  /// Capacity of every rolling history.
  pub history_capacity:   usize,
  /// Published (and written back once) when the store has no categories.
  pub default_categories: Vec<String>,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      heartbeat_ms:       1_000,
      history_capacity:   MAX_HISTORY_POINTS,
      default_categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
    }
  }
}

impl SessionConfig {
  /// The heartbeat period, never shorter than one millisecond.
  pub fn heartbeat(&self) -> Duration { Duration::from_millis(self.heartbeat_ms.max(1)) }
}
