//! Tests for `MemoryStore` against its own subscriptions.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use campus_core::{
  asset::{Actor, Status},
  store::{AssetStore, Export, FeedEvent, Patch, Subscription, WriteFailure},
  time::Clock,
};

use crate::{Error, MemoryStore, MemorySubscription};

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> { self.0 }
}

fn clock() -> Arc<dyn Clock> {
  Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 11).unwrap()))
}

fn store() -> MemoryStore {
  let export = Export::from_value(json!({
    "assets": {
      "E-01": { "category": "energy", "type": "Solar Array", "val": 120 },
      "W-01": { "category": "water", "type": "Tank A", "val": "55", "status": "normal" }
    },
    "categories": ["energy", "water"]
  }))
  .unwrap();
  MemoryStore::from_export(export, clock())
}

fn patch(value: serde_json::Value) -> Patch {
  campus_core::store::patch_from_value(value).unwrap()
}

/// Skip the initial assets/categories pair.
async fn subscribed(s: &MemoryStore) -> MemorySubscription {
  let mut sub = s.subscribe().await.unwrap();
  sub.next().await.unwrap();
  sub.next().await.unwrap();
  sub
}

async fn next_assets(sub: &mut MemorySubscription) -> Vec<campus_core::asset::RawAsset> {
  match sub.next().await {
    Some(FeedEvent::Assets(assets)) => assets,
    other => panic!("expected an assets snapshot, got {other:?}"),
  }
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribe_delivers_current_state_first() {
  let s = store();
  let mut sub = s.subscribe().await.unwrap();

  let assets = next_assets(&mut sub).await;
  assert_eq!(assets.len(), 2);
  assert_eq!(assets[0].id, "E-01");
  assert_eq!(assets[1].kind, "Tank A");

  assert_eq!(
    sub.next().await,
    Some(FeedEvent::Categories(vec!["energy".into(), "water".into()]))
  );
}

#[tokio::test]
async fn every_subscriber_gets_full_snapshots() {
  let s = store();
  let mut a = subscribed(&s).await;
  let mut b = subscribed(&s).await;

  s.put_asset("P-01", json!({ "category": "controls", "val": 1 }))
    .await
    .unwrap();

  assert_eq!(next_assets(&mut a).await.len(), 3);
  assert_eq!(next_assets(&mut b).await.len(), 3);
}

#[tokio::test]
async fn outage_is_pushed_as_failure() {
  let s = store();
  let mut sub = subscribed(&s).await;

  s.report_outage("permission denied").await;
  assert_eq!(
    sub.next().await,
    Some(FeedEvent::Failed { reason: "permission denied".into() })
  );
  // Stored data is untouched.
  assert!(s.get_asset("E-01").await.is_some());
}

#[tokio::test]
async fn closing_ends_subscriptions() {
  let s = store();
  let mut sub = subscribed(&s).await;
  assert_eq!(s.subscriber_count().await, 1);

  s.close_subscriptions().await;
  assert_eq!(sub.next().await, None);
  assert_eq!(s.subscriber_count().await, 0);
}

#[tokio::test]
async fn dropped_subscribers_are_pruned() {
  let s = store();
  let sub = subscribed(&s).await;
  drop(sub);
  assert_eq!(s.subscriber_count().await, 0);
}

// ─── Updates ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_merges_top_level_fields() {
  let s = store();
  let mut sub = subscribed(&s).await;

  s.update_asset("W-01".into(), patch(json!({ "val": 80, "status": "offline" })), None)
    .await
    .unwrap();

  let record = s.get_asset("W-01").await.unwrap();
  assert_eq!(record["val"], 80);
  assert_eq!(record["type"], "Tank A");
  assert!(record.get("lastModifiedBy").is_none());

  let assets = next_assets(&mut sub).await;
  let tank = assets.iter().find(|a| a.id == "W-01").unwrap();
  assert_eq!(tank.status, Status::Offline);
}

#[tokio::test]
async fn update_with_actor_stamps_last_modified_by() {
  let s = store();
  let actor = Actor { name: None, email: "ops@example.com".into() };

  s.update_asset("E-01".into(), patch(json!({ "val": 90 })), Some(actor))
    .await
    .unwrap();

  let record = s.get_asset("E-01").await.unwrap();
  assert_eq!(
    record["lastModifiedBy"],
    json!({
      "name": "Unknown",
      "email": "ops@example.com",
      "time": "5 Mar 2025, 2:30:11 PM"
    })
  );
}

#[tokio::test]
async fn null_removes_a_field() {
  let s = store();
  s.update_asset("W-01".into(), patch(json!({ "status": null })), None)
    .await
    .unwrap();

  let record = s.get_asset("W-01").await.unwrap();
  assert!(record.get("status").is_none());
}

#[tokio::test]
async fn update_unknown_asset_fails() {
  let s = store();
  let err = s
    .update_asset("NOPE".into(), patch(json!({ "val": 1 })), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AssetNotFound(id) if id == "NOPE"));
}

#[tokio::test]
async fn patch_cannot_rewrite_the_id() {
  let s = store();
  let err = s
    .update_asset("W-01".into(), patch(json!({ "id": "E-01", "val": 1 })), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ImmutableField("id")));
  assert_eq!(MemoryStore::classify(&err), WriteFailure::Invalid);

  let record = s.get_asset("W-01").await.unwrap();
  assert!(record.get("id").is_none());
  assert_eq!(record["val"], "55");
}

#[tokio::test]
async fn write_errors_are_classified() {
  let s = store();
  let missing = s
    .update_asset("NOPE".into(), patch(json!({ "val": 1 })), None)
    .await
    .unwrap_err();
  assert_eq!(MemoryStore::classify(&missing), WriteFailure::NotFound);

  s.set_read_only(true).await;
  let denied = s.delete_asset("W-01".into()).await.unwrap_err();
  assert_eq!(MemoryStore::classify(&denied), WriteFailure::PermissionDenied);
}

// ─── Deletes ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_record_and_publishes() {
  let s = store();
  let mut sub = subscribed(&s).await;

  s.delete_asset("E-01".into()).await.unwrap();
  assert!(s.get_asset("E-01").await.is_none());

  let assets = next_assets(&mut sub).await;
  assert_eq!(assets.len(), 1);
  assert_eq!(assets[0].id, "W-01");
}

#[tokio::test]
async fn delete_missing_asset_is_a_no_op() {
  let s = store();
  s.delete_asset("NOPE".into()).await.unwrap();
}

// ─── Permissions & categories ────────────────────────────────────────────────

#[tokio::test]
async fn read_only_store_rejects_writes() {
  let s = store();
  s.set_read_only(true).await;

  assert!(matches!(
    s.update_asset("E-01".into(), patch(json!({ "val": 1 })), None).await,
    Err(Error::PermissionDenied)
  ));
  assert!(matches!(s.delete_asset("E-01".into()).await, Err(Error::PermissionDenied)));
  assert!(matches!(
    s.set_categories(vec!["energy".into()]).await,
    Err(Error::PermissionDenied)
  ));
  assert_eq!(s.get_asset("E-01").await.unwrap()["val"], 120);

  s.set_read_only(false).await;
  s.delete_asset("E-01".into()).await.unwrap();
}

#[tokio::test]
async fn set_categories_publishes_the_new_list() {
  let s = store();
  let mut sub = subscribed(&s).await;

  s.set_categories(vec!["energy".into(), "water".into(), "waste".into()])
    .await
    .unwrap();

  assert_eq!(s.categories().await.len(), 3);
  assert!(matches!(
    sub.next().await,
    Some(FeedEvent::Categories(cats)) if cats.last().map(String::as_str) == Some("waste")
  ));
}

#[tokio::test]
async fn load_parses_an_export() {
  let s = MemoryStore::load(r#"{"assets": [{"id": "A", "val": 1}]}"#, clock()).unwrap();
  assert!(s.get_asset("0").await.is_some());
  assert!(s.categories().await.is_empty());

  assert!(matches!(MemoryStore::load("[1, 2]", clock()), Err(Error::Core(_))));
}
