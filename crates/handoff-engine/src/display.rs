//! Display formatting for reconciled instants.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

/// Rendered in place of an instant that could not be computed.
pub const UNAVAILABLE: &str = "Unavailable";

/// Numeric month/day/year plus a 12-hour clock, e.g. `3/16/2026, 6:00 PM`.
pub fn format_instant<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.format("%-m/%-d/%Y, %-I:%M %p").to_string()
}

/// [`format_instant`], or [`UNAVAILABLE`] for `None`.
pub fn format_optional<Tz>(instant: Option<&DateTime<Tz>>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.map_or_else(|| UNAVAILABLE.to_string(), format_instant)
}
