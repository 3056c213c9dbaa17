//! Handlers for `/assets` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/assets` | Optional `?category=<name>` (case-insensitive) |
//! | `GET`    | `/assets/{id}` | 404 if not in the latest snapshot |
//! | `PATCH`  | `/assets/{id}` | Body: [`UpdateBody`]; 204 once the store accepts it |
//! | `DELETE` | `/assets/{id}` | 204 once the store accepts it |
//!
//! Writes are forwarded to the store; the derived state only changes when the
//! resulting snapshot arrives.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use campus_core::{
  asset::{Actor, Asset},
  store::{AssetStore, Patch},
};
use campus_session::SessionClient;
use serde::Deserialize;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub category: Option<String>,
}

/// `GET /assets[?category=<name>]`
pub async fn list<S: AssetStore>(
  State(client): State<SessionClient<S>>,
  Query(params): Query<ListParams>,
) -> Json<Vec<Asset>> {
  let view = client.view();
  let assets = view
    .assets
    .iter()
    .filter(|a| {
      params
        .category
        .as_deref()
        .is_none_or(|c| a.category.eq_ignore_ascii_case(c))
    })
    .cloned()
    .collect();
  Json(assets)
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /assets/{id}`
pub async fn get_one<S: AssetStore>(
  State(client): State<SessionClient<S>>,
  Path(id): Path<String>,
) -> Result<Json<Asset>, ApiError> {
  client
    .view()
    .asset(&id)
    .cloned()
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("asset {id} not found")))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  /// Top-level fields to merge; `null` removes a field.
  pub fields: Patch,
  /// Recorded as `lastModifiedBy` when present.
  #[serde(default)]
  pub actor:  Option<Actor>,
}

/// `PATCH /assets/{id}` with body `{"fields": {...}, "actor": {...}}`
pub async fn update<S: AssetStore>(
  State(client): State<SessionClient<S>>,
  Path(id): Path<String>,
  Json(body): Json<UpdateBody>,
) -> Result<StatusCode, ApiError> {
  if body.fields.is_empty() {
    return Err(ApiError::BadRequest("no fields to update".into()));
  }
  client.request_update(id, body.fields, body.actor).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /assets/{id}`
pub async fn delete<S: AssetStore>(
  State(client): State<SessionClient<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  client.request_delete(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
