//! Asset records: the raw shape delivered by the store and the derived shape
//! handed to the view layer.
//!
//! Raw records are decoded leniently: a malformed field falls back to its
//! default instead of rejecting the record, so one bad entry never blocks the
//! rest of a snapshot.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::history::HistoryPoint;

/// Categories seeded when the store has none.
pub const DEFAULT_CATEGORIES: [&str; 2] = ["energy", "water"];

// ─── Status ─────────────────────────────────────────────────────────────────

/// Operational status of an asset. Exactly one holds at a time.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  #[default]
  Normal,
  Warning,
  Critical,
  /// Suppresses threshold evaluation and aggregate participation.
  Offline,
}

impl Status {
  /// Case-insensitive parse of the store's status string.
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "normal" => Some(Self::Normal),
      "warning" => Some(Self::Warning),
      "critical" => Some(Self::Critical),
      "offline" => Some(Self::Offline),
      _ => None,
    }
  }

  pub fn is_online(self) -> bool { !matches!(self, Self::Offline) }

  /// `warning` or `critical`.
  pub fn is_alert(self) -> bool { matches!(self, Self::Warning | Self::Critical) }
}

// ─── Flow type ──────────────────────────────────────────────────────────────

/// Role of an asset in the energy balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
  Producer,
  Consumer,
  Storage,
  Sensor,
}

impl FlowType {
  pub fn parse(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "producer" => Some(Self::Producer),
      "consumer" => Some(Self::Consumer),
      "storage" => Some(Self::Storage),
      "sensor" => Some(Self::Sensor),
      _ => None,
    }
  }
}

// ─── Range ──────────────────────────────────────────────────────────────────

/// Threshold configuration for automatic status derivation.
///
/// `min > max` and `min == max` are accepted as-is; see
/// [`crate::threshold::evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
  pub min:     f64,
  pub max:     f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub min_msg: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub max_msg: Option<String>,
}

impl Range {
  pub fn new(min: f64, max: f64) -> Self {
    Self { min, max, min_msg: None, max_msg: None }
  }

  pub fn with_messages(
    mut self,
    min_msg: impl Into<String>,
    max_msg: impl Into<String>,
  ) -> Self {
    self.min_msg = Some(min_msg.into());
    self.max_msg = Some(max_msg.into());
    self
  }

  /// Decode a range from the store. Returns `None` unless both bounds are
  /// numeric; a half-configured range is treated as absent.
  pub fn from_value(value: &Value) -> Option<Self> {
    let obj = value.as_object()?;
    let min = obj.get("min").and_then(strict_number)?;
    let max = obj.get("max").and_then(strict_number)?;
    Some(Self {
      min,
      max,
      min_msg: non_empty_str(obj.get("minMsg")),
      max_msg: non_empty_str(obj.get("maxMsg")),
    })
  }
}

// ─── Audit metadata ─────────────────────────────────────────────────────────

/// The user on whose behalf a write-back is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  #[serde(default)]
  pub name:  Option<String>,
  pub email: String,
}

impl Actor {
  pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
    Self { name: Some(name.into()), email: email.into() }
  }

  /// Build the `lastModifiedBy` record for a write made at `time`.
  pub fn stamp(&self, time: String) -> AuditStamp {
    let name = self
      .name
      .as_deref()
      .map(str::trim)
      .filter(|n| !n.is_empty())
      .unwrap_or("Unknown")
      .to_owned();
    AuditStamp { name, email: self.email.clone(), time }
  }
}

/// Who touched a record and when. Opaque to the derivation logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
  pub name:  String,
  pub email: String,
  pub time:  String,
}

// ─── Raw asset ──────────────────────────────────────────────────────────────

/// One record as it arrives from the store, before any derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAsset {
  pub id:               String,
  pub category:         String,
  /// Human label, e.g. "Water Tank A" (`type` in the store).
  pub kind:             String,
  pub details:          String,
  /// Untyped reading; parsed with [`parse_reading`].
  pub val:              Value,
  pub status:           Status,
  pub range:            Option<Range>,
  pub flow_type:        Option<FlowType>,
  pub coords:           Option<[f64; 2]>,
  pub created_by:       Option<AuditStamp>,
  pub last_modified_by: Option<AuditStamp>,
}

impl RawAsset {
  /// Convenience constructor with every optional field left unset.
  pub fn new(
    id: impl Into<String>,
    category: impl Into<String>,
    val: impl Into<Value>,
  ) -> Self {
    Self {
      id:               id.into(),
      category:         category.into(),
      kind:             String::new(),
      details:          String::new(),
      val:              val.into(),
      status:           Status::Normal,
      range:            None,
      flow_type:        None,
      coords:           None,
      created_by:       None,
      last_modified_by: None,
    }
  }

  pub fn with_status(mut self, status: Status) -> Self {
    self.status = status;
    self
  }

  pub fn with_range(mut self, range: Range) -> Self {
    self.range = Some(range);
    self
  }

  pub fn with_flow_type(mut self, flow_type: FlowType) -> Self {
    self.flow_type = Some(flow_type);
    self
  }

  /// Decode a stored record. Never fails: `key` stands in for a missing id
  /// and every other malformed field takes its default.
  pub fn from_value(key: &str, value: &Value) -> Self {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);

    let id = match obj.get("id") {
      Some(Value::String(s)) if !s.is_empty() => s.clone(),
      Some(Value::Number(n)) => n.to_string(),
      _ => key.to_owned(),
    };

    Self {
      id,
      category:         string_field(obj, "category"),
      kind:             string_field(obj, "type"),
      details:          string_field(obj, "details"),
      val:              obj.get("val").cloned().unwrap_or(Value::Null),
      status:           obj
        .get("status")
        .and_then(Value::as_str)
        .and_then(Status::parse)
        .unwrap_or_default(),
      range:            obj.get("range").and_then(Range::from_value),
      flow_type:        obj
        .get("flowType")
        .and_then(Value::as_str)
        .and_then(FlowType::parse),
      coords:           obj.get("coords").and_then(decode_coords),
      created_by:       obj.get("createdBy").and_then(decode_stamp),
      last_modified_by: obj.get("lastModifiedBy").and_then(decode_stamp),
    }
  }
}

// ─── Derived asset ──────────────────────────────────────────────────────────

/// A fully resolved asset, as surfaced to the view layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
  pub id:               String,
  pub category:         String,
  #[serde(rename = "type")]
  pub kind:             String,
  pub details:          String,
  /// Signed reading; the sign carries producer/consumer meaning.
  pub val:              f64,
  pub status:           Status,
  pub range:            Option<Range>,
  pub flow_type:        FlowType,
  pub coords:           Option<[f64; 2]>,
  /// Threshold violations for the current evaluation cycle only.
  pub incidents:        Vec<String>,
  pub history:          Vec<HistoryPoint>,
  /// When a value or status change was last detected.
  pub last_updated:     Option<String>,
  pub created_by:       Option<AuditStamp>,
  pub last_modified_by: Option<AuditStamp>,
}

impl Asset {
  pub fn is_online(&self) -> bool { self.status.is_online() }

  pub fn is_energy(&self) -> bool {
    self.category.eq_ignore_ascii_case("energy")
  }
}

// ─── Value parsing ──────────────────────────────────────────────────────────

/// Parse a raw reading to a finite number.
///
/// Numbers pass through; strings contribute their leading numeric prefix
/// (`"12.5 kW"` is `12.5`). Anything else, and any non-finite result, is `0`.
pub fn parse_reading(val: &Value) -> f64 {
  let parsed = match val {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => leading_number(s),
    _ => None,
  };
  parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// The longest prefix of `s` (after leading whitespace) that reads as a
/// decimal number with optional sign, fraction and exponent.
fn leading_number(s: &str) -> Option<f64> {
  let s = s.trim_start();
  let bytes = s.as_bytes();
  let digits_in = |mut i: usize| {
    while i < bytes.len() && bytes[i].is_ascii_digit() {
      i += 1;
    }
    i
  };

  let mut end = 0;
  if matches!(bytes.first(), Some(b'+' | b'-')) {
    end = 1;
  }
  let mantissa_start = end;
  let int_end = digits_in(end);
  let mut mantissa_digits = int_end - mantissa_start;
  end = int_end;
  if bytes.get(end) == Some(&b'.') {
    let frac_end = digits_in(end + 1);
    mantissa_digits += frac_end - (end + 1);
    end = frac_end;
  }
  if mantissa_digits == 0 {
    return None;
  }

  if matches!(bytes.get(end), Some(b'e' | b'E')) {
    let mut exp = end + 1;
    if matches!(bytes.get(exp), Some(b'+' | b'-')) {
      exp += 1;
    }
    let exp_end = digits_in(exp);
    if exp_end > exp {
      end = exp_end;
    }
  }

  s[..end].parse().ok()
}

/// A number, or a string that is entirely a number. Used for range bounds,
/// where `"100kW"` must not silently read as `100`.
fn strict_number(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
  .filter(|v: &f64| v.is_finite())
}

/// Normalise a user-supplied category name. Returns `None` for blank input.
pub fn normalize_category(name: &str) -> Option<String> {
  let cat = name.trim().to_lowercase();
  (!cat.is_empty()).then_some(cat)
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
  match obj.get(key) {
    Some(Value::String(s)) => s.clone(),
    Some(Value::Number(n)) => n.to_string(),
    _ => String::new(),
  }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
  value
    .and_then(Value::as_str)
    .filter(|s| !s.trim().is_empty())
    .map(str::to_owned)
}

fn decode_coords(value: &Value) -> Option<[f64; 2]> {
  match value.as_array()?.as_slice() {
    [lat, lon] => Some([strict_number(lat)?, strict_number(lon)?]),
    _ => None,
  }
}

fn decode_stamp(value: &Value) -> Option<AuditStamp> {
  serde_json::from_value(value.clone()).ok()
}
