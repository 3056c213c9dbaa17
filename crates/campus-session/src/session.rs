//! The session actor and its client handle.
//!
//! [`Worker`] owns the reducer state, the aggregate ticker and the published
//! view. It runs on one task and reacts to three things: a feed event, a
//! heartbeat tick and cancellation. Because a single `select!` loop handles
//! them, snapshot recomputes and heartbeats are applied one at a time.

use std::{sync::Arc, time::Duration};

use campus_core::{
  aggregate::{AggregateTicker, Totals},
  asset::{Actor, Asset, normalize_category},
  reducer::ReducerState,
  store::{AssetStore, FeedEvent, Patch, Subscription},
  time::Clock,
};
use tokio::{
  sync::watch,
  task::JoinHandle,
  time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{DashboardView, Error, FeedStatus, Result, SessionConfig};

// ─── Session ────────────────────────────────────────────────────────────────

/// A running session. Dropping it stops the worker and its heartbeat; call
/// [`Session::shutdown`] to also wait for the worker to finish.
pub struct Session<S: AssetStore> {
  client: SessionClient<S>,
  guard:  DropGuard,
  task:   JoinHandle<()>,
}

impl<S: AssetStore + 'static> Session<S> {
  /// Subscribe to `store` and start the worker.
  pub async fn spawn(
    store: Arc<S>,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
  ) -> Result<Self> {
    let subscription = store
      .subscribe()
      .await
      .map_err(|e| Error::Subscribe(Box::new(e)))?;

    let worker = Worker::new(Arc::clone(&store), &config, clock);
    let (tx, rx) = watch::channel(Arc::new(worker.view()));
    let cancel = CancellationToken::new();
    let task = tokio::spawn(worker.run(subscription, tx, cancel.clone()));

    tracing::info!(heartbeat_ms = config.heartbeat_ms, "session started");
    Ok(Self {
      client: SessionClient { store, view: rx },
      guard: cancel.drop_guard(),
      task,
    })
  }

  /// A cloneable handle for reading the view and issuing write-backs.
  pub fn client(&self) -> SessionClient<S> { self.client.clone() }

  /// Stop the worker, release the heartbeat timer and wait for the task.
  pub async fn shutdown(self) {
    self.guard.disarm().cancel();
    if let Err(e) = self.task.await {
      tracing::error!(error = %e, "session worker panicked");
    }
    tracing::info!("session stopped");
  }
}

// ─── Client ─────────────────────────────────────────────────────────────────

/// Read access to the published view plus the outbound write-back calls.
///
/// Write-backs go straight to the store and never touch local state; their
/// effect shows up with the next snapshot.
pub struct SessionClient<S: AssetStore> {
  store: Arc<S>,
  view:  watch::Receiver<Arc<DashboardView>>,
}

impl<S: AssetStore> Clone for SessionClient<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), view: self.view.clone() }
  }
}

impl<S: AssetStore> SessionClient<S> {
  /// The latest published view.
  pub fn view(&self) -> Arc<DashboardView> { Arc::clone(&self.view.borrow()) }

  /// A receiver notified on every publish.
  pub fn watch(&self) -> watch::Receiver<Arc<DashboardView>> { self.view.clone() }

  /// Merge `fields` into asset `id`, stamping `actor` as the modifier.
  pub async fn request_update(
    &self,
    id: impl Into<String>,
    fields: Patch,
    actor: Option<Actor>,
  ) -> Result<()> {
    let id = id.into();
    self
      .store
      .update_asset(id.clone(), fields, actor)
      .await
      .map_err(|e| {
        tracing::warn!(%id, error = %e, "asset update rejected");
        write_back::<S>(e)
      })
  }

  /// Remove asset `id` from the store.
  pub async fn request_delete(&self, id: impl Into<String>) -> Result<()> {
    let id = id.into();
    self.store.delete_asset(id.clone()).await.map_err(|e| {
      tracing::warn!(%id, error = %e, "asset delete rejected");
      write_back::<S>(e)
    })
  }

  /// Add a category to the store's list. Names are trimmed and lowercased.
  /// Returns `false` without writing when the name is blank or already known.
  pub async fn add_category(&self, name: &str) -> Result<bool> {
    let Some(category) = normalize_category(name) else {
      return Ok(false);
    };
    let mut categories = self.view().categories.as_ref().clone();
    if categories.contains(&category) {
      return Ok(false);
    }
    categories.push(category);

    self.store.set_categories(categories).await.map_err(|e| {
      tracing::warn!(error = %e, "category write rejected");
      write_back::<S>(e)
    })?;
    Ok(true)
  }
}

fn write_back<S: AssetStore>(e: S::Error) -> Error {
  Error::WriteBack { kind: S::classify(&e), source: Box::new(e) }
}

// ─── Worker ─────────────────────────────────────────────────────────────────

struct Worker<S> {
  store:              Arc<S>,
  clock:              Arc<dyn Clock>,
  heartbeat:          Duration,
  reducer:            ReducerState,
  ticker:             AggregateTicker,
  assets:             Arc<Vec<Asset>>,
  categories:         Arc<Vec<String>>,
  default_categories: Vec<String>,
  seeded_categories:  bool,
  feed:               FeedStatus,
}

impl<S: AssetStore + 'static> Worker<S> {
  fn new(store: Arc<S>, config: &SessionConfig, clock: Arc<dyn Clock>) -> Self {
    Self {
      store,
      clock,
      heartbeat: config.heartbeat(),
      reducer: ReducerState::new(config.history_capacity),
      ticker: AggregateTicker::new(config.history_capacity),
      assets: Arc::default(),
      categories: Arc::default(),
      default_categories: config.default_categories.clone(),
      seeded_categories: false,
      feed: FeedStatus::Connecting,
    }
  }

  async fn run(
    mut self,
    mut subscription: S::Subscription,
    tx: watch::Sender<Arc<DashboardView>>,
    cancel: CancellationToken,
  ) {
    let mut heartbeat = tokio::time::interval_at(Instant::now() + self.heartbeat, self.heartbeat);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut feed_open = true;

    loop {
      let dirty = tokio::select! {
        _ = cancel.cancelled() => break,
        event = subscription.next(), if feed_open => match event {
          Some(event) => {
            self.apply(event);
            true
          }
          None => {
            tracing::warn!("asset feed closed");
            feed_open = false;
            self.feed = FeedStatus::Closed;
            true
          }
        },
        _ = heartbeat.tick() => self.ticker.heartbeat(self.clock.now()),
      };

      if dirty {
        tx.send_replace(Arc::new(self.view()));
      }
    }
  }

  fn apply(&mut self, event: FeedEvent) {
    match event {
      FeedEvent::Assets(raw) => {
        let now = self.clock.now();
        let reduction = self.reducer.reduce(raw, now);
        self.ticker.record(Totals::from_assets(&reduction.assets), now);
        tracing::debug!(
          assets = reduction.assets.len(),
          changed = reduction.changed,
          purged = reduction.purged,
          "snapshot reduced"
        );
        self.assets = Arc::new(reduction.assets);
        if self.feed != FeedStatus::Live {
          tracing::info!("asset feed live");
          self.feed = FeedStatus::Live;
        }
      }
      FeedEvent::Categories(categories) if categories.is_empty() => {
        self.categories = Arc::new(self.default_categories.clone());
        self.seed_categories();
      }
      FeedEvent::Categories(categories) => self.categories = Arc::new(categories),
      FeedEvent::Failed { reason } => {
        tracing::warn!(%reason, "asset feed failed; keeping last snapshot");
        self.feed = FeedStatus::Stale { reason };
      }
    }
  }

  /// Write the default categories back to the store, once per session.
  fn seed_categories(&mut self) {
    if self.seeded_categories {
      return;
    }
    self.seeded_categories = true;
    tracing::info!(categories = ?self.default_categories, "seeding default categories");

    let store = Arc::clone(&self.store);
    let categories = self.default_categories.clone();
    tokio::spawn(async move {
      if let Err(e) = store.set_categories(categories).await {
        tracing::warn!(error = %e, "failed to seed default categories");
      }
    });
  }

  fn view(&self) -> DashboardView {
    DashboardView {
      assets:     Arc::clone(&self.assets),
      totals:     self.ticker.latest().clone(),
      aggregate:  self.ticker.history(),
      categories: Arc::clone(&self.categories),
      feed:       self.feed.clone(),
    }
  }
}
