//! # handoff-engine
//!
//! Deterministic handoff-window reconciliation for food-rescue pairings.
//!
//! A donor has surplus food until they close; a recipient can collect once
//! they open. Given each party's weekly operating hours and the current time,
//! the engine finds the donor's next closing instant and the recipient's first
//! opening instant after it. The current time is always passed in, never read
//! from the system clock, so every result is reproducible.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{TimeZone, Utc, Weekday};
//! use handoff_engine::{reconcile, DaySchedule, WeeklySchedule};
//!
//! let donor = WeeklySchedule::default()
//!     .with_day(Weekday::Mon, DaySchedule::hours("9:00 AM", "6:00 PM"));
//! let recipient = WeeklySchedule::default()
//!     .with_day(Weekday::Tue, DaySchedule::hours("8:00 AM", "5:00 PM"));
//!
//! // Monday 2026-03-16, noon.
//! let now = Utc.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap();
//! let window = reconcile(&donor, &recipient, &now);
//!
//! assert_eq!(window.donor_closing, Some(Utc.with_ymd_and_hms(2026, 3, 16, 18, 0, 0).unwrap()));
//! assert_eq!(window.recipient_opening, Some(Utc.with_ymd_and_hms(2026, 3, 17, 8, 0, 0).unwrap()));
//! ```
//!
//! ## Modules
//!
//! - [`wallclock`] — `"9:30 AM"` → hour/minute, lenient and strict
//! - [`schedule`] — weekly operating-hours model and record loading
//! - [`reconcile`](mod@reconcile) — next closing / next opening scans and their composition
//! - [`display`] — `M/D/YYYY, H:MM AM` rendering and `"Unavailable"`
//! - [`handoff`] — the accepted-handoff record payload
//! - [`error`] — Error types

use chrono::{DateTime, NaiveDateTime, TimeZone};

pub mod display;
pub mod error;
pub mod handoff;
pub mod reconcile;
mod record;
pub mod schedule;
pub mod wallclock;

pub use display::{format_instant, format_optional, UNAVAILABLE};
pub use error::HandoffError;
pub use handoff::{AcceptedHandoff, Party};
pub use reconcile::{find_next_closing, find_next_opening, reconcile, Reconciler, Reconciliation};
pub use schedule::{DaySchedule, TimeField, WeeklySchedule};
pub use wallclock::{
    parse_optional_wall_clock_time, parse_wall_clock_time, parse_wall_clock_time_strict,
    ParseMode, WallClockTime,
};

/// Parse an instant given as RFC 3339, or as a naive `YYYY-MM-DDTHH:MM[:SS]`
/// local time in `tz`.
///
/// Shared by the command-line and WASM surfaces.
///
/// # Errors
/// Returns [`HandoffError::InvalidDateTime`] if neither form matches or the
/// local time does not exist in `tz`.
pub fn parse_instant<Tz: TimeZone>(text: &str, tz: &Tz) -> error::Result<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(tz));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .ok_or_else(|| HandoffError::InvalidDateTime(text.to_string()))
}

/// Resolve an IANA time zone name.
///
/// # Errors
/// Returns [`HandoffError::InvalidTimezone`] for unknown names.
pub fn parse_timezone(name: &str) -> error::Result<chrono_tz::Tz> {
    name.parse()
        .map_err(|_| HandoffError::InvalidTimezone(name.to_string()))
}
