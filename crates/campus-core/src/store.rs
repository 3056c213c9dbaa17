//! The `AssetStore` trait, the realtime store the monitor subscribes to and
//! writes back into.
//!
//! The trait is implemented by storage backends (e.g. `campus-store-memory`).
//! Higher layers (`campus-session`, `campus-api`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use serde_json::{Map, Value};

use crate::{
  Error, Result,
  asset::{Actor, RawAsset},
  error::json_kind,
};

/// A merge-patch for one record: top-level keys replace the stored ones and a
/// `null` value removes the key.
pub type Patch = Map<String, Value>;

/// Interpret `value` as a [`Patch`].
pub fn patch_from_value(value: Value) -> Result<Patch> {
  match value {
    Value::Object(map) => Ok(map),
    other => Err(Error::InvalidPatch(json_kind(&other))),
  }
}

// ─── Feed ───────────────────────────────────────────────────────────────────

/// One push from the store. Snapshots are always complete, never deltas.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
  /// The entire current asset collection.
  Assets(Vec<RawAsset>),
  /// The entire current category list. May be empty.
  Categories(Vec<String>),
  /// The store could not deliver a snapshot.
  Failed { reason: String },
}

/// A live subscription to the store's asset and category nodes.
pub trait Subscription: Send {
  /// Wait for the next event. `None` once the subscription has ended.
  fn next(&mut self) -> impl Future<Output = Option<FeedEvent>> + Send + '_;
}

// ─── Export ─────────────────────────────────────────────────────────────────

/// A full dump of the store: `{"assets": {...}, "categories": [...]}`.
///
/// `assets` may be keyed by id or be an array (holes allowed); `categories`
/// may be an array or an object of strings.
#[derive(Debug, Clone, Default)]
pub struct Export {
  /// `(key, record)` pairs in store order.
  pub assets:     Vec<(String, Value)>,
  pub categories: Vec<String>,
}

impl Export {
  pub fn parse(text: &str) -> Result<Self> {
    Self::from_value(serde_json::from_str(text)?)
  }

  pub fn from_value(root: Value) -> Result<Self> {
    let mut root = match root {
      Value::Object(map) => map,
      Value::Null => return Ok(Self::default()),
      other => return Err(Error::UnexpectedShape(json_kind(&other))),
    };

    let assets = match root.remove("assets").unwrap_or(Value::Null) {
      Value::Null => Vec::new(),
      Value::Object(map) => map.into_iter().collect(),
      Value::Array(items) => items
        .into_iter()
        .enumerate()
        .filter(|(_, v)| !v.is_null())
        .map(|(i, v)| (i.to_string(), v))
        .collect(),
      other => return Err(Error::UnexpectedShape(json_kind(&other))),
    };

    let categories = match root.remove("categories").unwrap_or(Value::Null) {
      Value::Array(items) => items,
      Value::Object(map) => map.into_values().collect(),
      _ => Vec::new(),
    }
    .into_iter()
    .filter_map(|v| v.as_str().map(str::to_owned))
    .collect();

    Ok(Self { assets, categories })
  }
}

// ─── Trait ──────────────────────────────────────────────────────────────────

/// Coarse kind of a failed write, used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
  /// The target record does not exist.
  NotFound,
  /// The caller may only read.
  PermissionDenied,
  /// The write itself was malformed.
  Invalid,
  /// Any other backend failure.
  Unavailable,
}

/// Abstraction over the realtime key-value store holding the `assets` and
/// `categories` nodes.
///
/// Writes are fire-and-forget from the monitor's point of view: a successful
/// write is observed through the next snapshot, never applied locally.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait AssetStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
  type Subscription: Subscription + 'static;

  /// Open a subscription. The first events carry the current assets and
  /// categories.
  fn subscribe(
    &self,
  ) -> impl Future<Output = Result<Self::Subscription, Self::Error>> + Send + '_;

  /// Merge `fields` into the record `id`. With an `actor`, the store stamps
  /// `lastModifiedBy` using the shared timestamp format.
  fn update_asset(
    &self,
    id: String,
    fields: Patch,
    actor: Option<Actor>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove the record `id` entirely.
  fn delete_asset(
    &self,
    id: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Replace the category list.
  fn set_categories(
    &self,
    categories: Vec<String>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Classify a write error. Backends without finer detail report
  /// [`WriteFailure::Unavailable`].
  fn classify(error: &Self::Error) -> WriteFailure {
    let _ = error;
    WriteFailure::Unavailable
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn export_keyed_assets() {
    let export = Export::from_value(json!({
      "assets": { "E-01": { "val": 1 }, "W-01": { "val": 2 } },
      "categories": ["energy", "water", 3]
    }))
    .unwrap();

    let keys: Vec<&str> = export.assets.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["E-01", "W-01"]);
    assert_eq!(export.categories, vec!["energy", "water"]);
  }

  #[test]
  fn export_array_assets_skip_holes() {
    let export = Export::from_value(json!({
      "assets": [null, { "id": "A" }, { "id": "B" }],
      "categories": { "a": "energy" }
    }))
    .unwrap();

    assert_eq!(export.assets.len(), 2);
    assert_eq!(export.assets[0].0, "1");
    assert_eq!(export.categories, vec!["energy"]);
  }

  #[test]
  fn export_null_and_missing_nodes_are_empty() {
    assert!(Export::from_value(Value::Null).unwrap().assets.is_empty());
    let export = Export::parse("{}").unwrap();
    assert!(export.assets.is_empty());
    assert!(export.categories.is_empty());
  }

  #[test]
  fn export_rejects_scalar_root() {
    assert!(matches!(
      Export::from_value(json!(42)),
      Err(Error::UnexpectedShape("number"))
    ));
    assert!(matches!(Export::parse("not json"), Err(Error::Serialization(_))));
  }

  #[test]
  fn patch_must_be_an_object() {
    assert!(patch_from_value(json!({ "val": 3 })).is_ok());
    assert!(matches!(
      patch_from_value(json!([1])),
      Err(Error::InvalidPatch("array"))
    ));
  }
}
