//! The one timestamp format shared by histories, `lastUpdated` and audit
//! stamps, plus the clock seam used to source "now".
//!
//! Timestamps are compared by string equality for duplicate detection, so
//! every timestamp in the system must come from [`format_timestamp`].

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// India Standard Time, UTC+05:30 (no daylight saving).
pub const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// `"5 Mar 2025, 2:30:11 PM"`.
pub const TIMESTAMP_FORMAT: &str = "%-d %b %Y, %-I:%M:%S %p";

/// Format `at` as an IST wall-clock string with second resolution.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
  at.with_timezone(&ist()).format(TIMESTAMP_FORMAT).to_string()
}

/// UTC+05:30. The offset is in range, so the UTC fallback never applies.
fn ist() -> FixedOffset { FixedOffset::east_opt(IST_OFFSET_SECS).unwrap_or_else(|| Utc.fix()) }

/// Source of the current instant.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}
