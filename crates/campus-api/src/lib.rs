//! JSON REST API for the campus monitor.
//!
//! Exposes an axum [`Router`] over a running [`SessionClient`]: the derived
//! asset list, the aggregate series, categories and feed status, plus the
//! update and delete write-backs. Auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", campus_api::api_router(session.client()))
//! ```

pub mod aggregate;
pub mod assets;
pub mod categories;
pub mod error;
pub mod status;

use axum::{Router, routing::get};
use campus_core::store::AssetStore;
use campus_session::SessionClient;

pub use error::ApiError;

/// Build the API router for `client`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(client: SessionClient<S>) -> Router<()>
where
  S: AssetStore + 'static,
{
  Router::new()
    // Assets
    .route("/assets", get(assets::list::<S>))
    .route(
      "/assets/{id}",
      get(assets::get_one::<S>)
        .patch(assets::update::<S>)
        .delete(assets::delete::<S>),
    )
    // Aggregates
    .route("/aggregate", get(aggregate::handler::<S>))
    // Categories
    .route(
      "/categories",
      get(categories::list::<S>).post(categories::create::<S>),
    )
    // Feed
    .route("/status", get(status::handler::<S>))
    .with_state(client)
}
