//! System-wide totals and the rolling aggregate series.
//!
//! [`AggregateTicker`] owns one bounded `{time, load, generation}` series fed
//! by two triggers: [`AggregateTicker::record`] after every derived snapshot,
//! and [`AggregateTicker::heartbeat`] on a fixed interval so the series keeps
//! advancing when nothing changes. The ticker itself is not synchronised; its
//! owner must serialise the two triggers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  asset::{Asset, FlowType, Status},
  history::{HistoryBuffer, MAX_HISTORY_POINTS},
  time::format_timestamp,
};

// ─── Totals ─────────────────────────────────────────────────────────────────

/// Health counts for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategoryHealth {
  pub total:  usize,
  pub online: usize,
  pub normal: usize,
  pub alerts: usize,
}

/// Totals computed from one derived asset collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
  /// Load drawn by online energy consumers.
  pub consumption:    f64,
  /// Output of online energy producers.
  pub generation:     f64,
  /// `generation - consumption`.
  pub net:            f64,
  /// Online assets of every category.
  pub active_count:   usize,
  /// Assets in `warning` or `critical`.
  pub alert_count:    usize,
  pub critical_count: usize,
  /// Keyed by lowercased category.
  pub categories:     BTreeMap<String, CategoryHealth>,
}

impl Totals {
  /// Only online assets in the `energy` category contribute to the energy
  /// balance. Producers count as generation and consumers as consumption;
  /// other flow types (storage, sensor) fall back to the sign of the reading.
  pub fn from_assets(assets: &[Asset]) -> Self {
    let mut totals = Self::default();

    for asset in assets {
      let online = asset.is_online();
      let health = totals
        .categories
        .entry(asset.category.to_lowercase())
        .or_default();
      health.total += 1;
      if online {
        health.online += 1;
        totals.active_count += 1;
      }
      if asset.status == Status::Normal {
        health.normal += 1;
      }
      if asset.status.is_alert() {
        health.alerts += 1;
        totals.alert_count += 1;
      }
      if asset.status == Status::Critical {
        totals.critical_count += 1;
      }

      if !(online && asset.is_energy()) {
        continue;
      }
      let abs_val = asset.val.abs();
      match asset.flow_type {
        FlowType::Producer => totals.generation += abs_val,
        FlowType::Consumer => totals.consumption += abs_val,
        FlowType::Storage | FlowType::Sensor => {
          if asset.val > 0.0 {
            totals.generation += asset.val;
          } else {
            totals.consumption += abs_val;
          }
        }
      }
    }

    totals.net = totals.generation - totals.consumption;
    totals
  }
}

// ─── Aggregate series ───────────────────────────────────────────────────────

/// One point of the aggregate chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatePoint {
  pub time:       String,
  pub load:       f64,
  pub generation: f64,
}

/// The aggregate series and the latest event-driven totals.
#[derive(Debug, Clone)]
pub struct AggregateTicker {
  history: HistoryBuffer<AggregatePoint>,
  latest:  Totals,
}

impl Default for AggregateTicker {
  fn default() -> Self { Self::new(MAX_HISTORY_POINTS) }
}

impl AggregateTicker {
  pub fn new(capacity: usize) -> Self {
    Self { history: HistoryBuffer::new(capacity), latest: Totals::default() }
  }

  /// Store `totals` as the latest result and append a point, unless the last
  /// point has the same timestamp and the same load. Returns whether a point
  /// was appended.
  pub fn record(&mut self, totals: Totals, now: DateTime<Utc>) -> bool {
    let time = format_timestamp(now);
    let point = AggregatePoint {
      time,
      load: totals.consumption,
      generation: totals.generation,
    };
    self.latest = totals;

    let duplicate = self
      .history
      .last()
      .is_some_and(|last| last.time == point.time && last.load == point.load);
    if duplicate {
      return false;
    }
    self.history.append(point);
    true
  }

  /// Re-emit the latest totals stamped at `now`, skipped when the last point
  /// already carries that timestamp. Returns whether a point was appended.
  pub fn heartbeat(&mut self, now: DateTime<Utc>) -> bool {
    let time = format_timestamp(now);
    if self.history.last().is_some_and(|last| last.time == time) {
      return false;
    }
    self.history.append(AggregatePoint {
      time,
      load: self.latest.consumption,
      generation: self.latest.generation,
    });
    true
  }

  pub fn latest(&self) -> &Totals { &self.latest }

  pub fn history(&self) -> Vec<AggregatePoint> { self.history.snapshot() }

  pub fn len(&self) -> usize { self.history.len() }

  pub fn is_empty(&self) -> bool { self.history.is_empty() }
}
