//! Threshold evaluation: derive a status and incident messages from a reading
//! and its configured range.

use crate::asset::{Range, Status};

/// Outcome of one evaluation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
  pub status:    Status,
  /// Messages for this cycle only; never carried into the next one.
  pub incidents: Vec<String>,
}

/// Evaluate `abs_val` against `range`.
///
/// Nothing is evaluated while the asset is offline or has no range: the
/// current status is returned untouched. Above `max` is `critical`, below
/// `min` is `warning`; a reading back inside the bounds clears an alert
/// status to `normal`. With `min == max` (or `min > max`) almost every reading
/// is out of range, and that is accepted rather than corrected.
pub fn evaluate(
  abs_val: f64,
  range: Option<&Range>,
  current: Status,
  is_online: bool,
) -> Evaluation {
  let range = match range {
    Some(range) if is_online => range,
    _ => return Evaluation { status: current, incidents: Vec::new() },
  };

  if abs_val > range.max {
    let msg = range
      .max_msg
      .clone()
      .unwrap_or_else(|| format!("Value {abs_val} exceeds max {}", range.max));
    Evaluation { status: Status::Critical, incidents: vec![msg] }
  } else if abs_val < range.min {
    let msg = range
      .min_msg
      .clone()
      .unwrap_or_else(|| format!("Value {abs_val} below min {}", range.min));
    Evaluation { status: Status::Warning, incidents: vec![msg] }
  } else {
    let status = if current.is_alert() { Status::Normal } else { current };
    Evaluation { status, incidents: Vec::new() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn above_max_is_critical_with_generated_message() {
    let eval = evaluate(150.0, Some(&Range::new(0.0, 100.0)), Status::Normal, true);
    assert_eq!(eval.status, Status::Critical);
    assert_eq!(eval.incidents, vec!["Value 150 exceeds max 100".to_string()]);
  }

  #[test]
  fn below_min_is_warning_with_configured_message() {
    let range = Range::new(20.0, 100.0).with_messages("Tank low", "Tank overflow");
    let eval = evaluate(12.5, Some(&range), Status::Normal, true);
    assert_eq!(eval.status, Status::Warning);
    assert_eq!(eval.incidents, vec!["Tank low".to_string()]);
  }

  #[test]
  fn in_range_clears_warning_and_critical() {
    let range = Range::new(0.0, 100.0);
    for from in [Status::Warning, Status::Critical] {
      let eval = evaluate(50.0, Some(&range), from, true);
      assert_eq!(eval.status, Status::Normal);
      assert!(eval.incidents.is_empty());
    }
  }

  #[test]
  fn bounds_are_inclusive() {
    let range = Range::new(10.0, 100.0);
    assert_eq!(evaluate(10.0, Some(&range), Status::Normal, true).status, Status::Normal);
    assert_eq!(evaluate(100.0, Some(&range), Status::Normal, true).status, Status::Normal);
  }

  #[test]
  fn offline_suppresses_evaluation() {
    let eval = evaluate(9_999.0, Some(&Range::new(0.0, 100.0)), Status::Offline, false);
    assert_eq!(eval.status, Status::Offline);
    assert!(eval.incidents.is_empty());
  }

  #[test]
  fn missing_range_leaves_status_alone() {
    let eval = evaluate(9_999.0, None, Status::Warning, true);
    assert_eq!(eval.status, Status::Warning);
    assert!(eval.incidents.is_empty());
  }

  #[test]
  fn degenerate_ranges_are_not_corrected() {
    // min == max: only the exact bound reads as in range.
    let point = Range::new(50.0, 50.0);
    assert_eq!(evaluate(50.0, Some(&point), Status::Normal, true).status, Status::Normal);
    assert_eq!(evaluate(50.5, Some(&point), Status::Normal, true).status, Status::Critical);
    assert_eq!(evaluate(49.5, Some(&point), Status::Normal, true).status, Status::Warning);

    // min > max: every reading is flagged.
    let inverted = Range::new(100.0, 0.0);
    assert_eq!(evaluate(50.0, Some(&inverted), Status::Normal, true).status, Status::Critical);
    assert_eq!(evaluate(0.0, Some(&inverted), Status::Normal, true).status, Status::Warning);
  }
}
