//! One viewer session of the campus monitor.
//!
//! A session subscribes to an [`AssetStore`](campus_core::store::AssetStore),
//! derives asset state and aggregates on every snapshot, ticks the aggregate
//! series on a fixed heartbeat, and publishes the result as a
//! [`DashboardView`]. All derivation state is owned by a single task, so
//! snapshot processing and heartbeats never interleave.

mod config;
mod session;
mod view;

pub mod error;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use session::{Session, SessionClient};
pub use view::{DashboardView, FeedStatus};
