//! Shared interval primitives.
//!
//! Both the recurrence expander and the slot partitioner subtract booked
//! sub-intervals from a containing interval. The complement computation
//! lives here so the two components agree on boundary semantics.
//!
//! All comparisons are half-open over `[start, end)`: intervals that merely
//! touch do not overlap.

use chrono::{DateTime, Utc};

/// Anything that occupies a half-open `[start, end)` time interval.
pub trait TimeSpan {
    fn span_start(&self) -> DateTime<Utc>;
    fn span_end(&self) -> DateTime<Utc>;
}

/// Half-open overlap test: `a.start < b.end && b.start < a.end`.
///
/// Adjacent intervals, where one ends exactly when the other starts, do
/// not overlap.
pub fn overlaps(a: &impl TimeSpan, b: &impl TimeSpan) -> bool {
    a.span_start() < b.span_end() && b.span_start() < a.span_end()
}

/// Whether `b` lies entirely within `a`. Reflexive: every interval
/// contains itself.
pub fn contains(a: &impl TimeSpan, b: &impl TimeSpan) -> bool {
    a.span_start() <= b.span_start() && b.span_end() <= a.span_end()
}

/// Compute the complement of `masks` within `base`.
///
/// Masks are sorted by start time, then walked with a cursor: the gap
/// before each mask is kept when non-empty, and the trailing remainder
/// after the last mask is emitted at the end. Output is chronological.
///
/// Masks are expected to be contained in `base`; callers filter with
/// [`contains`] first. Overlapping masks are tolerated — the cursor never
/// moves backwards.
pub fn complement<M: TimeSpan>(
    base: &impl TimeSpan,
    masks: &[&M],
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut sorted: Vec<&M> = masks.to_vec();
    sorted.sort_by_key(|mask| mask.span_start());

    let mut gaps = Vec::new();
    let mut cursor = base.span_start();
    for mask in sorted {
        if cursor < mask.span_start() {
            gaps.push((cursor, mask.span_start()));
        }
        cursor = cursor.max(mask.span_end());
    }

    if cursor < base.span_end() {
        gaps.push((cursor, base.span_end()));
    }

    gaps
}
