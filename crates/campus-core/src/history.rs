//! Bounded, append-only time series.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Capacity of every rolling window: the last 60 points.
pub const MAX_HISTORY_POINTS: usize = 60;

/// One point of a per-asset series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
  pub time:  String,
  pub value: f64,
}

/// A fixed-capacity FIFO series. Appending past capacity evicts from the
/// front, so the buffer always holds the most recent points in the order
/// they were appended. It does no deduplication of its own.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
  points:   VecDeque<T>,
  capacity: usize,
}

impl<T: Clone> HistoryBuffer<T> {
  pub fn new(capacity: usize) -> Self {
    Self { points: VecDeque::with_capacity(capacity), capacity }
  }

  pub fn append(&mut self, point: T) {
    self.points.push_back(point);
    while self.points.len() > self.capacity {
      self.points.pop_front();
    }
  }

  /// An owned copy of the current series; later appends do not affect it.
  pub fn snapshot(&self) -> Vec<T> { self.points.iter().cloned().collect() }

  pub fn last(&self) -> Option<&T> { self.points.back() }

  pub fn len(&self) -> usize { self.points.len() }

  pub fn is_empty(&self) -> bool { self.points.is_empty() }

  pub fn capacity(&self) -> usize { self.capacity }
}

impl<T: Clone> Default for HistoryBuffer<T> {
  fn default() -> Self { Self::new(MAX_HISTORY_POINTS) }
}
