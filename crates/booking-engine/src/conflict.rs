//! Rule conflict detection — can two recurring rules ever overlap?
//!
//! Used at rule creation/update time to reject contradicting availability
//! declarations before they are stored. Adjacent occurrences, where one
//! ends exactly when the other starts, are NOT conflicts.

use crate::expander::between;
use crate::interval;
use crate::rule::Rule;

/// Decide whether two rules are capable of ever producing overlapping
/// events.
///
/// Three stages, cheapest first:
///
/// 1. Rules whose validity windows do not overlap never intersect,
///    whatever their configuration.
/// 2. Two unconstrained daily rules fire every day, so their occurrences
///    overlap iff their time-of-day intervals do — no expansion needed.
/// 3. Otherwise both rules are expanded over the shared window
///    `[max(starts), min(ends))` and every pair of occurrences is
///    compared. Bounding to the shared window keeps the expansion finite.
pub fn intersecting(a: &Rule, b: &Rule) -> bool {
    if !(a.start < b.end && b.start < a.end) {
        return false;
    }

    if a.daily_only() && b.daily_only() {
        return time_of_day_overlaps(a, b);
    }

    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    let first = between(a, start, end, &[]);
    let second = between(b, start, end, &[]);

    first
        .iter()
        .any(|x| second.iter().any(|y| interval::overlaps(x, y)))
}

/// Compare two rules' `time .. time + duration` intervals on a 24-hour
/// clock, in minutes from midnight. Same half-open overlap test as
/// concrete events; an interval reaching past midnight compares as a
/// same-day interval.
fn time_of_day_overlaps(a: &Rule, b: &Rule) -> bool {
    let a_start = a.time.minutes_from_midnight();
    let a_end = a_start + a.duration;
    let b_start = b.time.minutes_from_midnight();
    let b_end = b_start + b.duration;
    a_start < b_end && b_start < a_end
}
