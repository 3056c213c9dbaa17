//! Handler for `GET /status`: health of the inbound asset feed.

use axum::{Json, extract::State};
use campus_core::store::AssetStore;
use campus_session::{FeedStatus, SessionClient};

/// `GET /status`
pub async fn handler<S: AssetStore>(
  State(client): State<SessionClient<S>>,
) -> Json<FeedStatus> {
  Json(client.view().feed.clone())
}
