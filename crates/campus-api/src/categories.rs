//! Handlers for `/categories` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/categories` | Current list |
//! | `POST` | `/categories` | Body: `{"name":"waste"}`; 201 if added, 200 if already known or blank |

use axum::{Json, extract::State, http::StatusCode};
use campus_core::store::AssetStore;
use campus_session::SessionClient;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// `GET /categories`
pub async fn list<S: AssetStore>(
  State(client): State<SessionClient<S>>,
) -> Json<Vec<String>> {
  Json(client.view().categories.as_ref().clone())
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
  pub added: bool,
}

/// `POST /categories` with body `{"name":"waste"}`
pub async fn create<S: AssetStore>(
  State(client): State<SessionClient<S>>,
  Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError> {
  let added = client.add_category(&body.name).await?;
  let status = if added { StatusCode::CREATED } else { StatusCode::OK };
  Ok((status, Json(CreateResponse { added })))
}
