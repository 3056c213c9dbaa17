//! In-process realtime store for the campus monitor.
//!
//! Holds the `assets` and `categories` nodes in memory and pushes a complete
//! snapshot to every subscriber after each write, the way the hosted realtime
//! database does. Used by the monitor binary and as the test double for the
//! session and API layers.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{MemoryStore, MemorySubscription};

#[cfg(test)]
mod tests;
