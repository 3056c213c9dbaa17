//! Handler for `GET /aggregate`: latest totals and the rolling series.

use axum::{Json, extract::State};
use campus_core::{
  aggregate::{AggregatePoint, Totals},
  store::AssetStore,
};
use campus_session::SessionClient;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AggregateBody {
  pub totals:  Totals,
  pub history: Vec<AggregatePoint>,
}

/// `GET /aggregate`
pub async fn handler<S: AssetStore>(
  State(client): State<SessionClient<S>>,
) -> Json<AggregateBody> {
  let view = client.view();
  Json(AggregateBody {
    totals:  view.totals.clone(),
    history: view.aggregate.clone(),
  })
}
