//! Parsing of 12-hour wall-clock strings such as `"9:30 AM"`.
//!
//! Operating hours arrive as free text typed into a form, so two parsers exist:
//!
//! - [`parse_wall_clock_time`] is lenient. Anything it cannot make sense of
//!   becomes midnight, and out-of-range numbers pass through untouched. This is
//!   the compatibility behavior existing records were written against.
//! - [`parse_wall_clock_time_strict`] rejects anything that is not a real
//!   12-hour time and reports why.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{HandoffError, Result};

/// An hour/minute pair on a 24-hour clock.
///
/// Values produced by the lenient parser are not range-checked: `"9:75 AM"`
/// yields `minute == 75`, which rolls over into the next hour once applied to a
/// date with [`WallClockTime::on`]. Values too large to place on any date make
/// `on` return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct WallClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl WallClockTime {
    pub const MIDNIGHT: WallClockTime = WallClockTime { hour: 0, minute: 0 };

    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Place this time on a calendar date, seconds zeroed.
    ///
    /// Applied as an offset from midnight, so overflowing hours or minutes
    /// carry into the following hour or day. `None` if the result falls outside
    /// chrono's representable range.
    pub fn on(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        let offset = Duration::try_hours(i64::from(self.hour))?
            .checked_add(&Duration::try_minutes(i64::from(self.minute))?)?;
        date.and_time(NaiveTime::MIN).checked_add_signed(offset)
    }
}

impl fmt::Display for WallClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for WallClockTime {
    type Err = HandoffError;

    fn from_str(s: &str) -> Result<Self> {
        parse_wall_clock_time_strict(s)
    }
}

/// Which parser the scan operations use for schedule times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Malformed times silently become midnight.
    #[default]
    Lenient,
    /// Malformed times are reported as [`HandoffError::InvalidScheduleTime`].
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("AM") {
            Some(Meridiem::Am)
        } else if token.eq_ignore_ascii_case("PM") {
            Some(Meridiem::Pm)
        } else {
            None
        }
    }
}

/// Split `"H:MM"` into its hour and optional minute text.
fn split_clock(clock: &str) -> (&str, Option<&str>) {
    match clock.split_once(':') {
        Some((hour, minute)) => (hour, Some(minute)),
        None => (clock, None),
    }
}

/// Parse a run of ASCII digits. Rejects signs, blanks and anything else `u32`'s
/// `FromStr` would otherwise tolerate.
fn digits(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Lenient 12-hour parse.
///
/// - Blank input, or input that does not split into at least two
///   whitespace-separated tokens, is midnight.
/// - The first token is `H:MM` or `H`; a missing or non-numeric part reads as 0.
/// - `12 AM` becomes hour 0, `12 PM` stays 12, PM hours 1-11 gain 12. Any other
///   suffix leaves the hour as written.
///
/// Never fails.
pub fn parse_wall_clock_time(text: &str) -> WallClockTime {
    let mut tokens = text.split_whitespace();
    let (Some(clock), Some(suffix)) = (tokens.next(), tokens.next()) else {
        if !text.trim().is_empty() {
            warn!(input = text, "unparseable wall-clock time, falling back to midnight");
        }
        return WallClockTime::MIDNIGHT;
    };

    let (hour_text, minute_text) = split_clock(clock);
    let mut hour = digits(hour_text).unwrap_or(0);
    let minute = minute_text.and_then(digits).unwrap_or(0);

    match Meridiem::parse(suffix) {
        Some(Meridiem::Am) if hour == 12 => hour = 0,
        Some(Meridiem::Pm) if (1..=11).contains(&hour) => hour += 12,
        _ => {}
    }

    WallClockTime { hour, minute }
}

/// Lenient parse of a possibly-absent field. `None` is midnight.
pub fn parse_optional_wall_clock_time(text: Option<&str>) -> WallClockTime {
    text.map(parse_wall_clock_time).unwrap_or_default()
}

/// Strict 12-hour parse: `H[:MM] AM|PM`, hour 1-12, two-digit minute 00-59.
///
/// # Errors
/// Returns [`HandoffError::InvalidTime`] describing the first problem found.
pub fn parse_wall_clock_time_strict(text: &str) -> Result<WallClockTime> {
    let invalid = |reason: &str| HandoffError::InvalidTime {
        input: text.to_string(),
        reason: reason.to_string(),
    };

    let mut tokens = text.split_whitespace();
    let clock = tokens.next().ok_or_else(|| invalid("empty input"))?;
    let suffix = tokens.next().ok_or_else(|| invalid("missing AM/PM suffix"))?;
    if tokens.next().is_some() {
        return Err(invalid("unexpected trailing text"));
    }

    let meridiem = Meridiem::parse(suffix).ok_or_else(|| invalid("suffix must be AM or PM"))?;

    let (hour_text, minute_text) = split_clock(clock);
    let hour = digits(hour_text)
        .filter(|h| (1..=12).contains(h))
        .ok_or_else(|| invalid("hour must be between 1 and 12"))?;
    let minute = match minute_text {
        None => 0,
        Some(m) => Some(m)
            .filter(|m| m.len() == 2)
            .and_then(digits)
            .filter(|m| *m < 60)
            .ok_or_else(|| invalid("minutes must be two digits between 00 and 59"))?,
    };

    let hour = match (meridiem, hour) {
        (Meridiem::Am, 12) => 0,
        (Meridiem::Am, h) => h,
        (Meridiem::Pm, 12) => 12,
        (Meridiem::Pm, h) => h + 12,
    };

    Ok(WallClockTime { hour, minute })
}
