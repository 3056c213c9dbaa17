//! The published read model of a session.

use std::sync::Arc;

use campus_core::{
  aggregate::{AggregatePoint, Totals},
  asset::Asset,
};
use serde::Serialize;

/// Health of the inbound asset feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FeedStatus {
  /// No snapshot received yet.
  Connecting,
  Live,
  /// The store reported a failure; assets are the last good snapshot.
  Stale { reason: String },
  /// The subscription ended; assets are the last good snapshot.
  Closed,
}

/// Everything the view layer renders, as of the latest snapshot or heartbeat.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
  pub assets:     Arc<Vec<Asset>>,
  pub totals:     Totals,
  pub aggregate:  Vec<AggregatePoint>,
  pub categories: Arc<Vec<String>>,
  pub feed:       FeedStatus,
}

impl DashboardView {
  pub fn asset(&self, id: &str) -> Option<&Asset> {
    self.assets.iter().find(|a| a.id == id)
  }

  /// Assets currently in `warning` or `critical`.
  pub fn alerts(&self) -> impl Iterator<Item = &Asset> {
    self.assets.iter().filter(|a| a.status.is_alert())
  }
}
