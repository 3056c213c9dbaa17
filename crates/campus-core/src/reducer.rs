//! The asset state reducer: turns one raw snapshot into derived assets while
//! tracking, per id, the last observed `(val, status)` pair and a rolling
//! value history.
//!
//! All cross-snapshot state lives in [`ReducerState`]; the only impurity is
//! the `now` instant supplied by the caller.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::{
  asset::{Asset, RawAsset, Status, parse_reading},
  flow,
  history::{HistoryBuffer, HistoryPoint, MAX_HISTORY_POINTS},
  threshold,
  time::format_timestamp,
};

/// What the reducer remembers about one id between snapshots.
#[derive(Debug, Clone)]
struct Tracked {
  val:          f64,
  status:       Status,
  last_updated: Option<String>,
  history:      HistoryBuffer<HistoryPoint>,
}

/// Result of one reducer pass.
#[derive(Debug, Clone)]
pub struct Reduction {
  pub assets:  Vec<Asset>,
  /// Assets whose value or status changed (first observations excluded).
  pub changed: usize,
  /// Ids dropped because they were absent from the snapshot.
  pub purged:  usize,
}

/// Per-id state threaded through successive [`ReducerState::reduce`] calls.
#[derive(Debug, Clone)]
pub struct ReducerState {
  tracked:  HashMap<String, Tracked>,
  capacity: usize,
}

impl Default for ReducerState {
  fn default() -> Self { Self::new(MAX_HISTORY_POINTS) }
}

impl ReducerState {
  /// `capacity` bounds every per-asset history.
  pub fn new(capacity: usize) -> Self {
    Self { tracked: HashMap::new(), capacity }
  }

  /// Number of ids currently tracked.
  pub fn len(&self) -> usize { self.tracked.len() }

  pub fn is_empty(&self) -> bool { self.tracked.is_empty() }

  pub fn is_tracking(&self, id: &str) -> bool { self.tracked.contains_key(id) }

  /// Derive the asset collection for `snapshot`.
  ///
  /// Per record: parse the reading (malformed values become `0`), resolve the
  /// flow type, evaluate thresholds, then compare against the previous
  /// observation. A first observation only records a baseline. A changed
  /// value or status stamps `lastUpdated` and appends one history point.
  /// Anything else carries both over untouched. Ids missing from `snapshot`
  /// are forgotten, so a returning id starts over as a first observation.
  /// When several records share an id, only the first is kept.
  pub fn reduce(&mut self, snapshot: Vec<RawAsset>, now: DateTime<Utc>) -> Reduction {
    let mut stamp: Option<String> = None;
    let mut seen = HashSet::with_capacity(snapshot.len());
    let mut changed = 0;
    let mut assets = Vec::with_capacity(snapshot.len());

    for raw in snapshot {
      if !seen.insert(raw.id.clone()) {
        tracing::warn!(id = %raw.id, "duplicate asset id in snapshot, keeping the first record");
        continue;
      }

      let val = parse_reading(&raw.val);
      let flow_type = flow::classify(val, raw.flow_type);
      let eval = threshold::evaluate(
        val.abs(),
        raw.range.as_ref(),
        raw.status,
        raw.status.is_online(),
      );
      let status = eval.status;

      let (last_updated, history) = match self.tracked.get_mut(&raw.id) {
        None => {
          self.tracked.insert(raw.id.clone(), Tracked {
            val,
            status,
            last_updated: None,
            history: HistoryBuffer::new(self.capacity),
          });
          (None, Vec::new())
        }
        Some(tracked) => {
          if tracked.val != val || tracked.status != status {
            let time = stamp.get_or_insert_with(|| format_timestamp(now)).clone();
            tracked.history.append(HistoryPoint { time: time.clone(), value: val });
            tracked.last_updated = Some(time);
            tracked.val = val;
            tracked.status = status;
            changed += 1;
          }
          (tracked.last_updated.clone(), tracked.history.snapshot())
        }
      };

      assets.push(Asset {
        id: raw.id,
        category: raw.category,
        kind: raw.kind,
        details: raw.details,
        val,
        status,
        range: raw.range,
        flow_type,
        coords: raw.coords,
        incidents: eval.incidents,
        history,
        last_updated,
        created_by: raw.created_by,
        last_modified_by: raw.last_modified_by,
      });
    }

    let before = self.tracked.len();
    self.tracked.retain(|id, _| seen.contains(id));
    let purged = before - self.tracked.len();

    Reduction { assets, changed, purged }
  }
}
