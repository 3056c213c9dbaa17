//! Core types and derivation logic for the campus asset monitor.
//!
//! This crate is deliberately free of async-runtime, HTTP and storage
//! dependencies. It turns raw asset snapshots into derived asset state,
//! rolling histories and system-wide totals; everything that talks to the
//! outside world depends on it through the [`store::AssetStore`] trait.

pub mod aggregate;
pub mod asset;
pub mod error;
pub mod flow;
pub mod history;
pub mod reducer;
pub mod store;
pub mod threshold;
pub mod time;

pub use error::{Error, Result};
