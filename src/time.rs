//! Minimal time helper.
//!
//! The core only ever needs wall-clock seconds for `date_created`/
//! `date_modified` stamps; no calendar arithmetic is needed so this stays
//! on `std::time` rather than pulling in a date/time crate the way the
//! teacher does for IMAP-facing concerns.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as Unix seconds.
pub fn now_ts() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
