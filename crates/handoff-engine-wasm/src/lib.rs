//! WASM bindings for handoff-engine.
//!
//! Exposes handoff-window reconciliation and wall-clock parsing to JavaScript
//! via `wasm-bindgen`. All complex types are passed as JSON strings: schedules
//! go in as user records or bare `operatingHours` objects, results come back as
//! JSON with RFC 3339 instants plus their display strings.
//!
//! The current time is always an argument. The app shell samples its clock
//! once and passes the same value to every call for a given screen.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p handoff-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/handoff-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/handoff_engine_wasm.wasm
//! ```

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use handoff_engine::error::Result;
use handoff_engine::{
    format_optional, parse_instant, parse_timezone, parse_wall_clock_time,
    parse_wall_clock_time_strict, AcceptedHandoff, ParseMode, Party, Reconciler, WeeklySchedule,
};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WindowDto {
    donor_closing: Option<String>,
    recipient_opening: Option<String>,
    donor_closing_display: String,
    recipient_opening_display: String,
}

#[derive(Serialize)]
struct InstantDto {
    instant: Option<String>,
    display: String,
}

impl InstantDto {
    fn new(instant: Option<&DateTime<Tz>>) -> Self {
        Self {
            instant: instant.map(DateTime::to_rfc3339),
            display: format_optional(instant),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn reconciler(strict: bool) -> Reconciler {
    Reconciler::new(if strict {
        ParseMode::Strict
    } else {
        ParseMode::Lenient
    })
}

fn clock(now: &str, timezone: &str) -> Result<DateTime<Tz>> {
    let tz = parse_timezone(timezone)?;
    parse_instant(now, &tz)
}

fn parse_record(json: &str) -> Result<Value> {
    Ok(serde_json::from_str(json)?)
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// ---------------------------------------------------------------------------
// Boundary-independent implementations
// ---------------------------------------------------------------------------

fn reconcile_json(
    donor_json: &str,
    recipient_json: &str,
    now: &str,
    timezone: &str,
    strict: bool,
) -> Result<String> {
    let now = clock(now, timezone)?;
    let donor = WeeklySchedule::from_json_str(donor_json)?;
    let recipient = WeeklySchedule::from_json_str(recipient_json)?;

    let window = reconciler(strict).reconcile(&donor, &recipient, &now)?;
    let (donor_closing_display, recipient_opening_display) = window.display_pair();

    Ok(serde_json::to_string(&WindowDto {
        donor_closing: window.donor_closing.as_ref().map(DateTime::to_rfc3339),
        recipient_opening: window.recipient_opening.as_ref().map(DateTime::to_rfc3339),
        donor_closing_display,
        recipient_opening_display,
    })?)
}

fn next_closing_json(schedule_json: &str, now: &str, timezone: &str, strict: bool) -> Result<String> {
    let now = clock(now, timezone)?;
    let schedule = WeeklySchedule::from_json_str(schedule_json)?;
    let closing = reconciler(strict).next_closing(&schedule, &now)?;
    Ok(serde_json::to_string(&InstantDto::new(closing.as_ref()))?)
}

fn next_opening_json(
    schedule_json: &str,
    after: &str,
    now: &str,
    timezone: &str,
    strict: bool,
) -> Result<String> {
    let now = clock(now, timezone)?;
    let anchor = parse_instant(after, &now.timezone())?;
    let schedule = WeeklySchedule::from_json_str(schedule_json)?;
    let opening = reconciler(strict).next_opening(&schedule, &anchor, &now)?;
    Ok(serde_json::to_string(&InstantDto::new(opening.as_ref()))?)
}

fn parse_time_json(text: &str, strict: bool) -> Result<String> {
    let time = if strict {
        parse_wall_clock_time_strict(text)?
    } else {
        parse_wall_clock_time(text)
    };
    Ok(serde_json::to_string(&time)?)
}

fn accepted_handoff_json(
    donor_record_json: &str,
    recipient_record_json: &str,
    now: &str,
    accepted_at: Option<&str>,
    timezone: &str,
    strict: bool,
) -> Result<String> {
    let now = clock(now, timezone)?;
    let accepted_at = match accepted_at {
        Some(text) => parse_instant(text, &now.timezone())?,
        None => now.clone(),
    };
    let donor_record = parse_record(donor_record_json)?;
    let recipient_record = parse_record(recipient_record_json)?;

    let window = reconciler(strict).reconcile(
        &WeeklySchedule::from_record(&donor_record)?,
        &WeeklySchedule::from_record(&recipient_record)?,
        &now,
    )?;
    let record = AcceptedHandoff::new(
        &Party::from_record(&donor_record)?,
        &Party::from_record(&recipient_record)?,
        &window,
        accepted_at.with_timezone(&Utc),
    );
    Ok(serde_json::to_string(&record)?)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Reconcile a donor and a recipient.
///
/// `donor_json` and `recipient_json` are user records or bare `operatingHours`
/// objects. `now` is RFC 3339 or a naive local datetime in `timezone`. Returns
/// a JSON object with `donorClosing`, `recipientOpening` (RFC 3339 or null) and
/// their `...Display` strings.
#[wasm_bindgen(js_name = "reconcile")]
pub fn reconcile(
    donor_json: &str,
    recipient_json: &str,
    now: &str,
    timezone: &str,
    strict: bool,
) -> std::result::Result<String, JsValue> {
    reconcile_json(donor_json, recipient_json, now, timezone, strict).map_err(to_js_error)
}

/// The schedule's next closing time after `now`, as `{instant, display}`.
#[wasm_bindgen(js_name = "nextClosing")]
pub fn next_closing(
    schedule_json: &str,
    now: &str,
    timezone: &str,
    strict: bool,
) -> std::result::Result<String, JsValue> {
    next_closing_json(schedule_json, now, timezone, strict).map_err(to_js_error)
}

/// The schedule's next opening time after `after`, as `{instant, display}`.
#[wasm_bindgen(js_name = "nextOpening")]
pub fn next_opening(
    schedule_json: &str,
    after: &str,
    now: &str,
    timezone: &str,
    strict: bool,
) -> std::result::Result<String, JsValue> {
    next_opening_json(schedule_json, after, now, timezone, strict).map_err(to_js_error)
}

/// Parse a `"9:30 AM"` style string into `{hour, minute}`.
#[wasm_bindgen(js_name = "parseWallClockTime")]
pub fn parse_time(text: &str, strict: bool) -> std::result::Result<String, JsValue> {
    parse_time_json(text, strict).map_err(to_js_error)
}

/// Build the accepted-handoff record for two user records.
///
/// The window is computed from `now`. `accepted_at` stamps the record's
/// `timestamp`; when omitted, `now` is used.
#[wasm_bindgen(js_name = "acceptedHandoff")]
pub fn accepted_handoff(
    donor_record_json: &str,
    recipient_record_json: &str,
    now: &str,
    accepted_at: Option<String>,
    timezone: &str,
    strict: bool,
) -> std::result::Result<String, JsValue> {
    accepted_handoff_json(
        donor_record_json,
        recipient_record_json,
        now,
        accepted_at.as_deref(),
        timezone,
        strict,
    )
    .map_err(to_js_error)
}
