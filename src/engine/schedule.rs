use chrono::{Datelike, NaiveDate};
use ulid::Ulid;

use crate::model::{Period, Span};

use super::conflict::Conflict;

/// Decide whether the business is open for `window` on `date`.
///
/// Gates in order: an active period covering the date and applying to the
/// activity, an active weekday schedule, the window inside opening hours,
/// the window clear of the break. Returns the first failing gate.
pub fn validate_window(
    periods: &[Period],
    activity_id: Ulid,
    date: NaiveDate,
    window: &Span,
) -> Option<Conflict> {
    let Some(period) = periods
        .iter()
        .find(|p| p.is_active && p.covers(date) && p.applies_to(activity_id))
    else {
        return Some(Conflict::period("no active period for this date"));
    };

    let Some(schedule) = period.week.day(date.weekday()) else {
        return Some(Conflict::period("establishment closed this day"));
    };
    if !schedule.is_active {
        return Some(Conflict::period("establishment closed this day"));
    }

    if window.start < schedule.opens || window.end > schedule.closes {
        return Some(Conflict::period("outside opening hours"));
    }

    if let Some(break_window) = &schedule.break_window
        && break_window.overlaps(window)
    {
        return Some(Conflict::period("falls in break period"));
    }

    None
}
