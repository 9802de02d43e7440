//! Recurrence expansion — turns recurring rules into concrete events.
//!
//! Expansion is strategy-driven: each [`Frequency`] variant has a
//! [`RecurrenceExpander`] answering "when is the next occurrence at or
//! after a point in time", so bounded expansion never iterates past the
//! rule's validity window.
//!
//! For the supported rule shapes the day pattern is picked by the
//! optional refinements, not the declared cadence alone: a rule with no
//! weekday or month-day refinement recurs every day of its window
//! whatever its frequency, a weekday set narrows it to days of the week,
//! and a month-day narrows it to one day per month.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::{self, TimeSpan};
use crate::rule::{Frequency, Rule};

/// A single concrete occurrence of a rule, with the rule's duration
/// attached. Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSpan for Event {
    fn span_start(&self) -> DateTime<Utc> {
        self.start
    }

    fn span_end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// An occurrence tagged with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEvent {
    pub rule_id: u64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSpan for RuleEvent {
    fn span_start(&self) -> DateTime<Utc> {
        self.start
    }

    fn span_end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// A booked portion of a rule's availability, keyed by rule id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleBooking {
    pub rule_id: u64,
    pub start: DateTime<Utc>,
    /// Booked duration in minutes.
    pub duration: u32,
}

/// "Next occurrence" strategy for one recurrence cadence.
pub trait RecurrenceExpander {
    /// Whether the rule fires on this calendar day.
    fn matches(&self, rule: &Rule, date: NaiveDate) -> bool;

    /// The first occurrence starting at or after `from`, or `None` once
    /// the candidate leaves the rule's window. Walks forward one day at a
    /// time; the window bound guarantees termination.
    fn next_occurrence(&self, rule: &Rule, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut date = from.date_naive();
        loop {
            let candidate = occurrence_at(rule, date);
            if candidate >= rule.end {
                return None;
            }
            if candidate >= from && candidate >= rule.start && self.matches(rule, date) {
                return Some(candidate);
            }
            date = date.succ_opt()?;
        }
    }
}

/// Daily cadence: every day, narrowed by the optional refinements.
pub struct DailyRecurrence;

impl RecurrenceExpander for DailyRecurrence {
    fn matches(&self, rule: &Rule, date: NaiveDate) -> bool {
        weekday_allowed(rule, date) && monthday_allowed(rule, date)
    }
}

/// Weekly cadence: the refined weekdays of each week, or every day when
/// the rule carries no weekday set.
pub struct WeeklyRecurrence;

impl RecurrenceExpander for WeeklyRecurrence {
    fn matches(&self, rule: &Rule, date: NaiveDate) -> bool {
        weekday_allowed(rule, date) && monthday_allowed(rule, date)
    }
}

/// Monthly cadence: the refined day of each month (months without that
/// day are skipped), or the refined weekdays, or every day when
/// unconstrained.
pub struct MonthlyRecurrence;

impl RecurrenceExpander for MonthlyRecurrence {
    fn matches(&self, rule: &Rule, date: NaiveDate) -> bool {
        match rule.monthday {
            Some(day) => date.day() == u32::from(day),
            None => weekday_allowed(rule, date),
        }
    }
}

/// The expansion strategy for a frequency.
pub fn expander_for(frequency: Frequency) -> &'static dyn RecurrenceExpander {
    match frequency {
        Frequency::Daily => &DailyRecurrence,
        Frequency::Weekly => &WeeklyRecurrence,
        Frequency::Monthly => &MonthlyRecurrence,
    }
}

fn weekday_allowed(rule: &Rule, date: NaiveDate) -> bool {
    rule.weekdays.is_empty()
        || rule
            .weekdays
            .iter()
            .any(|weekday| weekday.to_chrono() == date.weekday())
}

fn monthday_allowed(rule: &Rule, date: NaiveDate) -> bool {
    rule.monthday
        .map_or(true, |day| date.day() == u32::from(day))
}

fn occurrence_at(rule: &Rule, date: NaiveDate) -> DateTime<Utc> {
    date.and_time(rule.time.as_naive()).and_utc()
}

/// Expand `rule` into every occurrence whose start falls in
/// `[start, end)`, each with the rule's duration attached, then mask out
/// any portion covered by an `exclude` event.
///
/// Output is ordered by start ascending, deterministic, and
/// non-overlapping. Occurrences are additionally bounded by the rule's
/// own validity window.
pub fn between(
    rule: &Rule,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: &[Event],
) -> Vec<Event> {
    let strategy = expander_for(rule.frequency);
    let duration = Duration::minutes(i64::from(rule.duration));

    let mut events = Vec::new();
    let mut from = start.max(rule.start);
    while let Some(occurrence) = strategy.next_occurrence(rule, from) {
        if occurrence >= end {
            break;
        }
        events.push(Event {
            start: occurrence,
            end: occurrence + duration,
        });
        from = occurrence + Duration::minutes(1);
    }

    if exclude.is_empty() {
        return events;
    }
    mask(&events, exclude)
}

/// Remove from each event any portion covered by a mask contained in it.
///
/// Masks that are not fully contained in an event are ignored for that
/// event. Events reduced to nothing disappear from the output.
pub fn mask(events: &[Event], masks: &[Event]) -> Vec<Event> {
    if masks.is_empty() {
        return events.to_vec();
    }

    let mut output = Vec::new();
    for event in events {
        let contained: Vec<&Event> = masks
            .iter()
            .filter(|candidate| interval::contains(event, *candidate))
            .collect();
        if contained.is_empty() {
            output.push(event.clone());
            continue;
        }
        output.extend(
            interval::complement(event, &contained)
                .into_iter()
                .map(|(start, end)| Event { start, end }),
        );
    }
    output
}

/// Expand a batch of rules over `[start, end)`, masking out each rule's
/// own booked time and tagging every surviving event with its rule id.
///
/// Deactivated and logically deleted rules contribute nothing. Bookings
/// are matched to rules by `rule_id`; bookings referencing other rules
/// are ignored.
pub fn unpack_rules(
    rules: &[Rule],
    bookings: &[RuleBooking],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<RuleEvent> {
    let mut output = Vec::new();
    for rule in rules {
        if !rule.is_active() {
            continue;
        }

        let booked: Vec<Event> = bookings
            .iter()
            .filter(|booking| booking.rule_id == rule.id)
            .map(|booking| Event {
                start: booking.start,
                end: booking.start + Duration::minutes(i64::from(booking.duration)),
            })
            .collect();

        output.extend(
            between(rule, start, end, &booked)
                .into_iter()
                .map(|event| RuleEvent {
                    rule_id: rule.id,
                    start: event.start,
                    end: event.end,
                }),
        );
    }
    output
}
