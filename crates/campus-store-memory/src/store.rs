//! [`MemoryStore`]: the in-memory implementation of [`AssetStore`].

use std::{collections::BTreeMap, sync::Arc};

use serde_json::{Map, Value};
use tokio::sync::{Mutex, mpsc};

use campus_core::{
  asset::{Actor, RawAsset},
  store::{AssetStore, Export, FeedEvent, Patch, Subscription, WriteFailure},
  time::{Clock, SystemClock, format_timestamp},
};

use crate::{Error, Result};

// ─── Store ──────────────────────────────────────────────────────────────────

/// A realtime key-value store held in memory.
///
/// Clones share the same data and subscribers.
#[derive(Clone)]
pub struct MemoryStore {
  inner: Arc<Mutex<Inner>>,
  clock: Arc<dyn Clock>,
}

#[derive(Default)]
struct Inner {
  assets:      BTreeMap<String, Value>,
  categories:  Vec<String>,
  read_only:   bool,
  subscribers: Vec<mpsc::UnboundedSender<FeedEvent>>,
}

impl Inner {
  fn snapshot(&self) -> Vec<RawAsset> {
    self
      .assets
      .iter()
      .map(|(key, record)| RawAsset::from_value(key, record))
      .collect()
  }

  /// Deliver `event` to every live subscriber, dropping the ones that hung up.
  fn broadcast(&mut self, event: FeedEvent) {
    self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
  }

  fn publish_assets(&mut self) {
    let event = FeedEvent::Assets(self.snapshot());
    self.broadcast(event);
  }

  fn ensure_writable(&self) -> Result<()> {
    if self.read_only {
      return Err(Error::PermissionDenied);
    }
    Ok(())
  }
}

impl Default for MemoryStore {
  fn default() -> Self { Self::new() }
}

impl MemoryStore {
  /// An empty store stamping audit times from the system clock.
  pub fn new() -> Self { Self::with_clock(Arc::new(SystemClock)) }

  pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
    Self { inner: Arc::new(Mutex::new(Inner::default())), clock }
  }

  /// A store pre-populated from a full export.
  pub fn from_export(export: Export, clock: Arc<dyn Clock>) -> Self {
    let inner = Inner {
      assets: export.assets.into_iter().collect(),
      categories: export.categories,
      ..Inner::default()
    };
    Self { inner: Arc::new(Mutex::new(inner)), clock }
  }

  /// Parse a JSON export and build a store from it.
  pub fn load(text: &str, clock: Arc<dyn Clock>) -> Result<Self> {
    Ok(Self::from_export(Export::parse(text)?, clock))
  }

  /// Create or replace the whole record `id`.
  pub async fn put_asset(&self, id: impl Into<String>, record: Value) -> Result<()> {
    let mut inner = self.inner.lock().await;
    inner.ensure_writable()?;
    inner.assets.insert(id.into(), record);
    inner.publish_assets();
    Ok(())
  }

  /// The stored record for `id`, as written.
  pub async fn get_asset(&self, id: &str) -> Option<Value> {
    self.inner.lock().await.assets.get(id).cloned()
  }

  pub async fn categories(&self) -> Vec<String> {
    self.inner.lock().await.categories.clone()
  }

  /// Reject (or accept again) every write, as a viewer-only connection would.
  pub async fn set_read_only(&self, read_only: bool) {
    self.inner.lock().await.read_only = read_only;
  }

  /// Push a delivery failure to every subscriber. Stored data is unaffected.
  pub async fn report_outage(&self, reason: impl Into<String>) {
    let reason = reason.into();
    tracing::warn!(%reason, "reporting feed outage to subscribers");
    self.inner.lock().await.broadcast(FeedEvent::Failed { reason });
  }

  /// End every open subscription.
  pub async fn close_subscriptions(&self) {
    self.inner.lock().await.subscribers.clear();
  }

  pub async fn subscriber_count(&self) -> usize {
    let mut inner = self.inner.lock().await;
    inner.subscribers.retain(|tx| !tx.is_closed());
    inner.subscribers.len()
  }
}

// ─── Subscription ───────────────────────────────────────────────────────────

/// The receiving end of [`MemoryStore::subscribe`].
pub struct MemorySubscription {
  rx: mpsc::UnboundedReceiver<FeedEvent>,
}

impl Subscription for MemorySubscription {
  async fn next(&mut self) -> Option<FeedEvent> { self.rx.recv().await }
}

// ─── AssetStore impl ────────────────────────────────────────────────────────

impl AssetStore for MemoryStore {
  type Error = Error;
  type Subscription = MemorySubscription;

  async fn subscribe(&self) -> Result<MemorySubscription> {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut inner = self.inner.lock().await;
    // The receiver is still held here, so these sends cannot fail.
    let _ = tx.send(FeedEvent::Assets(inner.snapshot()));
    let _ = tx.send(FeedEvent::Categories(inner.categories.clone()));
    inner.subscribers.push(tx);
    tracing::debug!(subscribers = inner.subscribers.len(), "subscription opened");
    Ok(MemorySubscription { rx })
  }

  async fn update_asset(
    &self,
    id: String,
    fields: Patch,
    actor: Option<Actor>,
  ) -> Result<()> {
    let stamp = actor
      .map(|actor| serde_json::to_value(actor.stamp(format_timestamp(self.clock.now()))))
      .transpose()?;

    let mut inner = self.inner.lock().await;
    inner.ensure_writable()?;
    if fields.contains_key("id") {
      return Err(Error::ImmutableField("id"));
    }
    let record = inner
      .assets
      .get_mut(&id)
      .ok_or_else(|| Error::AssetNotFound(id.clone()))?;
    if !record.is_object() {
      *record = Value::Object(Map::new());
    }
    if let Value::Object(map) = record {
      for (key, value) in fields {
        if value.is_null() {
          map.remove(&key);
        } else {
          map.insert(key, value);
        }
      }
      if let Some(stamp) = stamp {
        map.insert("lastModifiedBy".to_owned(), stamp);
      }
    }

    tracing::debug!(%id, "asset updated");
    inner.publish_assets();
    Ok(())
  }

  async fn delete_asset(&self, id: String) -> Result<()> {
    let mut inner = self.inner.lock().await;
    inner.ensure_writable()?;
    if inner.assets.remove(&id).is_some() {
      tracing::debug!(%id, "asset deleted");
      inner.publish_assets();
    }
    Ok(())
  }

  async fn set_categories(&self, categories: Vec<String>) -> Result<()> {
    let mut inner = self.inner.lock().await;
    inner.ensure_writable()?;
    inner.categories = categories.clone();
    inner.broadcast(FeedEvent::Categories(categories));
    Ok(())
  }

  fn classify(error: &Error) -> WriteFailure {
    match error {
      Error::AssetNotFound(_) => WriteFailure::NotFound,
      Error::PermissionDenied => WriteFailure::PermissionDenied,
      Error::ImmutableField(_) => WriteFailure::Invalid,
      Error::Core(_) | Error::Json(_) => WriteFailure::Unavailable,
    }
  }
}
