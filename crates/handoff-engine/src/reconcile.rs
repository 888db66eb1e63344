//! Donor/recipient handoff-window reconciliation.
//!
//! A handoff happens after the donor closes and once the recipient is open.
//! Given both parties' weekly hours and a single `now`, [`reconcile`] finds the
//! donor's next closing instant and the recipient's first opening instant after
//! it.
//!
//! Scans walk calendar dates forward from a baseline, eight dates in all
//! (today through the same weekday next week), and take the first eligible
//! candidate strictly later than the baseline. Because dates are visited in
//! order, the first hit is the soonest. The eighth date is what lets a closing
//! time that already passed today resolve to the same weekday a week out.
//!
//! All instants are computed as wall-clock times in the time zone of the
//! supplied `now`. An ambiguous local time (DST fall-back) resolves to the
//! earlier instant; a local time inside a DST gap shifts forward one hour.

use std::convert::Infallible;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDateTime, TimeZone, Weekday};
use serde::Serialize;
use tracing::{debug, trace};

use crate::display;
use crate::error::{HandoffError, Result};
use crate::schedule::{TimeField, WeeklySchedule};
use crate::wallclock::{
    parse_wall_clock_time, parse_wall_clock_time_strict, ParseMode, WallClockTime,
};

/// Number of days past the baseline date a scan looks at.
pub const SCAN_HORIZON_DAYS: u64 = 7;

/// The outcome of reconciling a donor and a recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", bound(serialize = "DateTime<Tz>: Serialize"))]
pub struct Reconciliation<Tz: TimeZone> {
    /// The donor's soonest closing instant after `now`.
    pub donor_closing: Option<DateTime<Tz>>,
    /// The recipient's soonest opening instant after the donor closes.
    /// Always `None` when `donor_closing` is.
    pub recipient_opening: Option<DateTime<Tz>>,
}

impl<Tz: TimeZone> Reconciliation<Tz> {
    /// Both ends of the handoff are known.
    pub fn is_feasible(&self) -> bool {
        self.donor_closing.is_some() && self.recipient_opening.is_some()
    }

    /// Display strings for both instants, `"Unavailable"` where absent.
    pub fn display_pair(&self) -> (String, String)
    where
        Tz::Offset: std::fmt::Display,
    {
        (
            display::format_optional(self.donor_closing.as_ref()),
            display::format_optional(self.recipient_opening.as_ref()),
        )
    }

    pub fn with_timezone<Tz2: TimeZone>(&self, tz: &Tz2) -> Reconciliation<Tz2> {
        Reconciliation {
            donor_closing: self.donor_closing.as_ref().map(|dt| dt.with_timezone(tz)),
            recipient_opening: self.recipient_opening.as_ref().map(|dt| dt.with_timezone(tz)),
        }
    }
}

/// Reconciliation with a configurable time parser.
///
/// In [`ParseMode::Lenient`] every method returns `Ok`. In
/// [`ParseMode::Strict`] the first malformed time on an eligible day aborts the
/// scan with [`HandoffError::InvalidScheduleTime`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconciler {
    parse_mode: ParseMode,
}

impl Reconciler {
    pub fn new(parse_mode: ParseMode) -> Self {
        Self { parse_mode }
    }

    pub fn lenient() -> Self {
        Self::new(ParseMode::Lenient)
    }

    pub fn strict() -> Self {
        Self::new(ParseMode::Strict)
    }

    pub fn parse_mode(&self) -> ParseMode {
        self.parse_mode
    }

    fn parse_time(&self, day: Weekday, field: TimeField, text: &str) -> Result<WallClockTime> {
        match self.parse_mode {
            ParseMode::Lenient => Ok(parse_wall_clock_time(text)),
            ParseMode::Strict => parse_wall_clock_time_strict(text).map_err(|e| match e {
                HandoffError::InvalidTime { input, reason } => HandoffError::InvalidScheduleTime {
                    day,
                    field,
                    input,
                    reason,
                },
                other => other,
            }),
        }
    }

    /// The donor's soonest closing instant strictly after `now`.
    pub fn next_closing<Tz: TimeZone>(
        &self,
        schedule: &WeeklySchedule,
        now: &DateTime<Tz>,
    ) -> Result<Option<DateTime<Tz>>> {
        scan(schedule, TimeField::Close, now, |day, text| {
            self.parse_time(day, TimeField::Close, text)
        })
    }

    /// The recipient's soonest opening instant strictly after `anchor`.
    ///
    /// If `anchor` is not after `now` it has already passed, and the search
    /// baseline moves one calendar day past it.
    pub fn next_opening<Tz: TimeZone>(
        &self,
        schedule: &WeeklySchedule,
        anchor: &DateTime<Tz>,
        now: &DateTime<Tz>,
    ) -> Result<Option<DateTime<Tz>>> {
        let Some(baseline) = opening_baseline(anchor, now) else {
            return Ok(None);
        };
        scan(schedule, TimeField::Open, &baseline, |day, text| {
            self.parse_time(day, TimeField::Open, text)
        })
    }

    /// Run both scans against a single `now`.
    pub fn reconcile<Tz: TimeZone>(
        &self,
        donor: &WeeklySchedule,
        recipient: &WeeklySchedule,
        now: &DateTime<Tz>,
    ) -> Result<Reconciliation<Tz>> {
        let donor_closing = self.next_closing(donor, now)?;
        let recipient_opening = match &donor_closing {
            Some(closing) => self.next_opening(recipient, closing, now)?,
            None => None,
        };
        debug!(
            now = %now.naive_local(),
            donor_closing = ?donor_closing.as_ref().map(DateTime::naive_local),
            recipient_opening = ?recipient_opening.as_ref().map(DateTime::naive_local),
            "reconciled handoff window"
        );
        Ok(Reconciliation {
            donor_closing,
            recipient_opening,
        })
    }
}

fn into_ok<T>(result: std::result::Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

fn lenient(_: Weekday, text: &str) -> std::result::Result<WallClockTime, Infallible> {
    Ok(parse_wall_clock_time(text))
}

/// The donor's soonest closing instant strictly after `now`, with lenient
/// time parsing. `None` when no eligible day falls inside the horizon.
pub fn find_next_closing<Tz: TimeZone>(
    schedule: &WeeklySchedule,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    into_ok(scan(schedule, TimeField::Close, now, lenient))
}

/// The recipient's soonest opening instant strictly after `anchor` (or after
/// the following day if `anchor` is not after `now`), with lenient parsing.
pub fn find_next_opening<Tz: TimeZone>(
    schedule: &WeeklySchedule,
    anchor: &DateTime<Tz>,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let baseline = opening_baseline(anchor, now)?;
    into_ok(scan(schedule, TimeField::Open, &baseline, lenient))
}

/// Lenient reconciliation. Never fails.
pub fn reconcile<Tz: TimeZone>(
    donor: &WeeklySchedule,
    recipient: &WeeklySchedule,
    now: &DateTime<Tz>,
) -> Reconciliation<Tz> {
    let donor_closing = find_next_closing(donor, now);
    let recipient_opening = donor_closing
        .as_ref()
        .and_then(|closing| find_next_opening(recipient, closing, now));
    Reconciliation {
        donor_closing,
        recipient_opening,
    }
}

fn opening_baseline<Tz: TimeZone>(
    anchor: &DateTime<Tz>,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    if anchor > now {
        return Some(anchor.clone());
    }
    trace!(anchor = %anchor.naive_local(), "anchor already passed, starting from next day");
    anchor
        .clone()
        .checked_add_days(Days::new(1))
        .or_else(|| anchor.clone().checked_add_signed(Duration::days(1)))
}

/// Resolve a local wall-clock time in `tz`.
fn localize<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&local).earliest().or_else(|| {
        let shifted = local.checked_add_signed(Duration::hours(1))?;
        tz.from_local_datetime(&shifted).earliest()
    })
}

fn scan<Tz, E, P>(
    schedule: &WeeklySchedule,
    field: TimeField,
    baseline: &DateTime<Tz>,
    parse: P,
) -> std::result::Result<Option<DateTime<Tz>>, E>
where
    Tz: TimeZone,
    P: Fn(Weekday, &str) -> std::result::Result<WallClockTime, E>,
{
    let tz = baseline.timezone();
    let start = baseline.date_naive();

    for offset in 0..=SCAN_HORIZON_DAYS {
        let Some(date) = start.checked_add_days(Days::new(offset)) else {
            break;
        };
        let weekday = date.weekday();
        let Some(text) = schedule.day(weekday).time(field) else {
            trace!(%date, %weekday, %field, "day not eligible");
            continue;
        };

        let time = parse(weekday, text)?;
        let Some(local) = time.on(date) else {
            debug!(%date, %time, "time out of range for date, skipping");
            continue;
        };
        let Some(candidate) = localize(&tz, local) else {
            debug!(%date, %time, "local time does not exist, skipping");
            continue;
        };

        if candidate > *baseline {
            debug!(%field, candidate = %candidate.naive_local(), "found candidate");
            return Ok(Some(candidate));
        }
        trace!(%date, %time, "candidate not after baseline");
    }

    debug!(%field, "no eligible day within horizon");
    Ok(None)
}
