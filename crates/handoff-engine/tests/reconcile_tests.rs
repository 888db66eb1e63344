//! Tests for next-closing / next-opening scans and their composition.
//!
//! Reference week: 2026-03-16 is a Monday.

use chrono::{DateTime, Duration, TimeZone, Utc, Weekday};
use chrono_tz::America::New_York;
use chrono_tz::Pacific::Apia;
use handoff_engine::reconcile::{find_next_closing, find_next_opening, reconcile, Reconciler};
use handoff_engine::schedule::{DaySchedule, TimeField, WeeklySchedule};
use handoff_engine::HandoffError;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn utc(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, minute, 0).unwrap()
}

fn only(weekday: Weekday, open: &str, close: &str) -> WeeklySchedule {
    WeeklySchedule::default().with_day(weekday, DaySchedule::hours(open, close))
}

const WEEKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

// ── find_next_closing ───────────────────────────────────────────────────────

#[test]
fn closing_later_today_is_returned() {
    let schedule = only(Weekday::Mon, "9:00 AM", "11:00 PM");
    let now = utc(16, 22, 0);

    assert_eq!(find_next_closing(&schedule, &now), Some(utc(16, 23, 0)));
}

#[test]
fn closing_already_passed_today_rolls_to_next_week() {
    let schedule = only(Weekday::Mon, "9:00 AM", "11:00 PM");
    let now = utc(16, 23, 30);

    assert_eq!(find_next_closing(&schedule, &now), Some(utc(23, 23, 0)));
}

#[test]
fn closing_exactly_now_is_not_returned() {
    let schedule = only(Weekday::Mon, "9:00 AM", "6:00 PM");
    let now = utc(16, 18, 0);

    assert_eq!(find_next_closing(&schedule, &now), Some(utc(23, 18, 0)));
}

#[test]
fn closing_picks_soonest_across_days() {
    let schedule = WeeklySchedule::uniform(&WEEKDAYS, "9:00 AM", "5:00 PM");
    // Monday evening, after close: Tuesday is next.
    let now = utc(16, 19, 0);

    assert_eq!(find_next_closing(&schedule, &now), Some(utc(17, 17, 0)));
}

#[test]
fn closing_skips_weekend_gap() {
    let schedule = WeeklySchedule::uniform(&WEEKDAYS, "9:00 AM", "5:00 PM");
    // Friday 2026-03-20 after close: next is Monday 2026-03-23.
    let now = utc(20, 18, 0);

    assert_eq!(find_next_closing(&schedule, &now), Some(utc(23, 17, 0)));
}

#[test]
fn closing_ignores_seconds_of_now() {
    let schedule = only(Weekday::Mon, "9:00 AM", "6:00 PM");
    let now = Utc.with_ymd_and_hms(2026, 3, 16, 17, 59, 59).unwrap();

    let closing = find_next_closing(&schedule, &now).unwrap();
    assert_eq!(closing, utc(16, 18, 0));
}

#[test]
fn closing_none_when_all_days_unavailable() {
    let mut schedule = WeeklySchedule::uniform(&WEEKDAYS, "9:00 AM", "5:00 PM");
    for weekday in WEEKDAYS {
        schedule.day_mut(weekday).available = false;
    }
    assert!(schedule.is_closed_all_week());

    assert_eq!(find_next_closing(&schedule, &utc(16, 8, 0)), None);
}

#[test]
fn closing_skips_available_day_with_blank_close() {
    let schedule = WeeklySchedule::default()
        .with_day(Weekday::Mon, DaySchedule::hours("9:00 AM", "   "))
        .with_day(Weekday::Wed, DaySchedule::hours("9:00 AM", "4:00 PM"));
    let now = utc(16, 8, 0);

    assert_eq!(find_next_closing(&schedule, &now), Some(utc(18, 16, 0)));
}

#[test]
fn closing_malformed_time_degrades_to_midnight() {
    let schedule = only(Weekday::Tue, "9:00 AM", "closing time");
    let now = utc(16, 12, 0);

    assert_eq!(find_next_closing(&schedule, &now), Some(utc(17, 0, 0)));
}

#[test]
fn closing_overflowing_minutes_roll_over() {
    let schedule = only(Weekday::Mon, "9:00 AM", "5:75 PM");
    let now = utc(16, 12, 0);

    assert_eq!(find_next_closing(&schedule, &now), Some(utc(16, 18, 15)));
}

#[test]
fn closing_with_unplaceable_hour_skips_that_day() {
    let schedule = WeeklySchedule::default()
        .with_day(Weekday::Mon, DaySchedule::hours("9:00 AM", "4000000000:00 AM"))
        .with_day(Weekday::Tue, DaySchedule::hours("9:00 AM", "6:00 PM"));
    let now = utc(16, 12, 0);

    assert_eq!(find_next_closing(&schedule, &now), Some(utc(17, 18, 0)));
}

#[test]
fn reconcile_with_only_unplaceable_hours_is_unavailable() {
    let donor = only(Weekday::Mon, "9:00 AM", "6:00 PM");
    let recipient = only(Weekday::Tue, "4000000000:00 AM", "5:00 PM");
    let now = utc(16, 12, 0);

    let window = reconcile(&donor, &recipient, &now);
    assert_eq!(window.donor_closing, Some(utc(16, 18, 0)));
    assert_eq!(window.recipient_opening, None);

    let unplaceable_donor = only(Weekday::Mon, "9:00 AM", "4000000000:00 AM");
    assert_eq!(find_next_closing(&unplaceable_donor, &now), None);
}

// ── find_next_opening ───────────────────────────────────────────────────────

#[test]
fn opening_next_day_after_closing() {
    let recipient = only(Weekday::Tue, "8:00 AM", "5:00 PM");
    let anchor = utc(16, 18, 0);
    let now = utc(16, 12, 0);

    assert_eq!(
        find_next_opening(&recipient, &anchor, &now),
        Some(utc(17, 8, 0))
    );
}

#[test]
fn opening_same_day_after_closing() {
    let recipient = only(Weekday::Mon, "7:00 PM", "10:00 PM");
    let anchor = utc(16, 18, 0);
    let now = utc(16, 12, 0);

    assert_eq!(
        find_next_opening(&recipient, &anchor, &now),
        Some(utc(16, 19, 0))
    );
}

#[test]
fn opening_before_closing_same_day_waits_a_week() {
    let recipient = only(Weekday::Mon, "8:00 AM", "5:00 PM");
    let anchor = utc(16, 18, 0);
    let now = utc(16, 12, 0);

    assert_eq!(
        find_next_opening(&recipient, &anchor, &now),
        Some(utc(23, 8, 0))
    );
}

#[test]
fn opening_with_passed_anchor_starts_next_day() {
    let recipient = only(Weekday::Mon, "7:00 PM", "10:00 PM");
    let anchor = utc(16, 18, 0);

    // Anchor still ahead: same-day opening is fine.
    let before = utc(16, 12, 0);
    assert_eq!(
        find_next_opening(&recipient, &anchor, &before),
        Some(utc(16, 19, 0))
    );

    // Anchor already behind `now`: the search starts Tuesday 18:00.
    let after = utc(16, 18, 30);
    assert_eq!(
        find_next_opening(&recipient, &anchor, &after),
        Some(utc(23, 19, 0))
    );
}

#[test]
fn opening_none_when_all_days_unavailable() {
    let recipient = WeeklySchedule::default();
    assert_eq!(
        find_next_opening(&recipient, &utc(16, 18, 0), &utc(16, 12, 0)),
        None
    );
}

// ── reconcile ───────────────────────────────────────────────────────────────

#[test]
fn reconcile_monday_close_tuesday_open() {
    let donor = only(Weekday::Mon, "9:00 AM", "6:00 PM");
    let recipient = only(Weekday::Tue, "8:00 AM", "5:00 PM");
    let now = utc(16, 12, 0);

    let window = reconcile(&donor, &recipient, &now);

    assert_eq!(window.donor_closing, Some(utc(16, 18, 0)));
    assert_eq!(window.recipient_opening, Some(utc(17, 8, 0)));
    assert!(window.is_feasible());
}

#[test]
fn reconcile_without_donor_closing_skips_recipient() {
    let donor = WeeklySchedule::default();
    let recipient = WeeklySchedule::uniform(&WEEKDAYS, "8:00 AM", "5:00 PM");

    let window = reconcile(&donor, &recipient, &utc(16, 12, 0));

    assert_eq!(window.donor_closing, None);
    assert_eq!(window.recipient_opening, None);
    assert!(!window.is_feasible());
}

#[test]
fn reconcile_donor_found_recipient_closed() {
    let donor = only(Weekday::Mon, "9:00 AM", "6:00 PM");
    let recipient = WeeklySchedule::default();

    let window = reconcile(&donor, &recipient, &utc(16, 12, 0));

    assert_eq!(window.donor_closing, Some(utc(16, 18, 0)));
    assert_eq!(window.recipient_opening, None);
    assert_eq!(
        window.display_pair(),
        ("3/16/2026, 6:00 PM".to_string(), "Unavailable".to_string())
    );
}

#[test]
fn reconcile_is_idempotent() {
    let donor = WeeklySchedule::uniform(&WEEKDAYS, "9:00 AM", "5:30 PM");
    let recipient = WeeklySchedule::uniform(&[Weekday::Sat, Weekday::Sun], "10:00 AM", "2:00 PM");
    let now = utc(18, 9, 15);

    let first = reconcile(&donor, &recipient, &now);
    let second = reconcile(&donor, &recipient, &now);

    assert_eq!(first, second);
    assert_eq!(first.donor_closing, Some(utc(18, 17, 30)));
    assert_eq!(first.recipient_opening, Some(utc(21, 10, 0)));
}

#[test]
fn reconcile_opening_never_precedes_closing() {
    let donor = WeeklySchedule::uniform(&WEEKDAYS, "9:00 AM", "5:00 PM");
    let recipient = WeeklySchedule::uniform(&WEEKDAYS, "6:00 AM", "8:00 PM");

    for hour in 0..24 {
        let now = utc(16, hour, 0);
        let window = reconcile(&donor, &recipient, &now);
        let closing = window.donor_closing.unwrap();
        let opening = window.recipient_opening.unwrap();
        assert!(opening > closing, "opening {} <= closing {}", opening, closing);
        assert!(closing - now <= Duration::days(7));
    }
}

// ── Reconciler (parse modes) ────────────────────────────────────────────────

#[test]
fn lenient_reconciler_matches_free_functions() {
    let donor = only(Weekday::Tue, "9:00 AM", "closing time");
    let recipient = only(Weekday::Wed, "8:00 AM", "5:00 PM");
    let now = utc(16, 12, 0);

    let window = Reconciler::lenient()
        .reconcile(&donor, &recipient, &now)
        .unwrap();

    assert_eq!(window, reconcile(&donor, &recipient, &now));
}

#[test]
fn strict_reconciler_reports_bad_schedule_time() {
    let donor = only(Weekday::Tue, "9:00 AM", "closing time");
    let recipient = only(Weekday::Wed, "8:00 AM", "5:00 PM");
    let now = utc(16, 12, 0);

    let err = Reconciler::strict()
        .reconcile(&donor, &recipient, &now)
        .unwrap_err();

    match err {
        HandoffError::InvalidScheduleTime {
            day, field, input, ..
        } => {
            assert_eq!(day, Weekday::Tue);
            assert_eq!(field, TimeField::Close);
            assert_eq!(input, "closing time");
        }
        other => panic!("expected InvalidScheduleTime, got {:?}", other),
    }
}

#[test]
fn strict_reconciler_ignores_unavailable_days() {
    let mut bad = DaySchedule::hours("??", "??");
    bad.available = false;
    let donor = only(Weekday::Mon, "9:00 AM", "6:00 PM").with_day(Weekday::Sun, bad);
    let recipient = only(Weekday::Tue, "8:00 AM", "5:00 PM");
    let now = utc(16, 12, 0);

    let window = Reconciler::strict()
        .reconcile(&donor, &recipient, &now)
        .unwrap();

    assert_eq!(window.donor_closing, Some(utc(16, 18, 0)));
    assert_eq!(window.recipient_opening, Some(utc(17, 8, 0)));
}

#[test]
fn strict_reconciler_checks_recipient_open_field() {
    let donor = only(Weekday::Mon, "9:00 AM", "6:00 PM");
    let recipient = only(Weekday::Tue, "25:00 AM", "5:00 PM");

    let err = Reconciler::strict()
        .reconcile(&donor, &recipient, &utc(16, 12, 0))
        .unwrap_err();

    assert!(matches!(
        err,
        HandoffError::InvalidScheduleTime {
            field: TimeField::Open,
            ..
        }
    ));
}

// ── Time zones ──────────────────────────────────────────────────────────────

#[test]
fn wall_clock_times_apply_in_the_zone_of_now() {
    let donor = only(Weekday::Mon, "9:00 AM", "6:00 PM");
    let now = New_York.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap();

    let closing = find_next_closing(&donor, &now).unwrap();

    assert_eq!(closing, New_York.with_ymd_and_hms(2026, 3, 16, 18, 0, 0).unwrap());
    // EDT is UTC-4 after 2026-03-08.
    assert_eq!(closing.with_timezone(&Utc), utc(16, 22, 0));
}

#[test]
fn dst_gap_shifts_forward_one_hour() {
    // 2026-03-08 02:30 does not exist in New York (clocks jump 02:00 → 03:00).
    let donor = only(Weekday::Sun, "1:00 AM", "2:30 AM");
    let now = New_York.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();

    let closing = find_next_closing(&donor, &now).unwrap();

    assert_eq!(closing, New_York.with_ymd_and_hms(2026, 3, 8, 3, 30, 0).unwrap());
}

#[test]
fn dst_overlap_takes_earlier_instant() {
    // 2026-11-01 01:30 happens twice in New York; take the EDT one.
    let donor = only(Weekday::Sun, "12:00 AM", "1:30 AM");
    let now = New_York.with_ymd_and_hms(2026, 10, 31, 12, 0, 0).unwrap();

    let closing = find_next_closing(&donor, &now).unwrap();

    assert_eq!(
        closing.with_timezone(&Utc),
        Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap()
    );
}

#[test]
fn date_missing_from_the_zone_is_skipped() {
    // Samoa skipped 2011-12-30 entirely, jumping from UTC-10 to UTC+14.
    let donor = WeeklySchedule::uniform(&[Weekday::Fri, Weekday::Sat], "9:00 AM", "10:00 AM");
    let now = Apia.with_ymd_and_hms(2011, 12, 29, 12, 0, 0).unwrap();

    let closing = find_next_closing(&donor, &now).unwrap();

    assert_eq!(closing, Apia.with_ymd_and_hms(2011, 12, 31, 10, 0, 0).unwrap());
}

#[test]
fn with_timezone_converts_both_instants() {
    let donor = only(Weekday::Mon, "9:00 AM", "6:00 PM");
    let recipient = only(Weekday::Tue, "8:00 AM", "5:00 PM");
    let now = New_York.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap();

    let window = reconcile(&donor, &recipient, &now).with_timezone(&Utc);

    assert_eq!(window.donor_closing, Some(utc(16, 22, 0)));
    assert_eq!(window.recipient_opening, Some(utc(17, 12, 0)));
}

#[test]
fn reconciliation_serializes_with_null_for_missing_instant() {
    let donor = only(Weekday::Mon, "9:00 AM", "6:00 PM");
    let window = reconcile(&donor, &WeeklySchedule::default(), &utc(16, 12, 0));

    let value = serde_json::to_value(&window).unwrap();
    assert_eq!(value["donorClosing"], "2026-03-16T18:00:00Z");
    assert!(value["recipientOpening"].is_null());
}
