//! Slot partitioning and booking validation.
//!
//! A [`Slot`] is a concrete availability window — produced by expanding a
//! rule into the visible horizon, or authored directly as a one-off.
//! Booking works in fixed-size units: a slot is divided into
//! [`SubSlot`]s, already-booked sub-intervals are subtracted, and a
//! proposed reservation is validated against the remainder.
//!
//! Everything here is pure and performs no I/O. Callers are responsible
//! for the read-check-write discipline around [`can_book`]: fetch the
//! booked subslots inside a transaction, call [`can_book`] with that
//! freshly-read data, and commit only on `true`, treating a failed
//! unique-constraint insert as the tie-breaker when two bookings race.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::interval::{self, TimeSpan};

/// What a slot may be booked for. Callers tag slots with it; the
/// algorithms never read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotPurpose {
    #[default]
    General,
    Lesson,
    Interview,
}

/// A concrete, addressable availability window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: u64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Owning tutor.
    pub owner: u64,
    #[serde(default)]
    pub purpose: SlotPurpose,
}

impl Slot {
    /// Check the slot's structural invariants. Callers must reject
    /// invalid slots before handing them to the partitioning operations.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidSlotDefinition` when the interval is
    /// empty or inverted.
    pub fn validate(&self) -> Result<()> {
        if self.end <= self.start {
            return Err(EngineError::InvalidSlotDefinition(
                "slot end must be after its start".to_string(),
            ));
        }
        Ok(())
    }
}

impl TimeSpan for Slot {
    fn span_start(&self) -> DateTime<Utc> {
        self.start
    }

    fn span_end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// A fixed-size partition unit of a slot. No identity of its own beyond
/// the parent slot id and the interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubSlot {
    pub parent: u64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSpan for SubSlot {
    fn span_start(&self) -> DateTime<Utc> {
        self.start
    }

    fn span_end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// A proposed reservation, evaluated against one slot and its booked
/// subslots. Never persisted by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub start: DateTime<Utc>,
    /// Requested duration in minutes.
    pub duration: u32,
}

impl TimeSpan for BookingRequest {
    fn span_start(&self) -> DateTime<Utc> {
        self.start
    }

    fn span_end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(i64::from(self.duration))
    }
}

/// Sort direction for [`order_slots`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Divide a slot into consecutive `unit_minutes`-length subslots starting
/// at the slot's start. Only whole units are emitted — a trailing
/// remainder shorter than the unit is dropped. A zero unit or a slot too
/// short to hold one unit yields an empty list, which is a valid outcome.
pub fn get_sub_slots(slot: &Slot, unit_minutes: u32) -> Vec<SubSlot> {
    if unit_minutes == 0 {
        return Vec::new();
    }

    let unit = Duration::minutes(i64::from(unit_minutes));
    let mut subslots = Vec::new();
    let mut start = slot.start;
    let mut end = start + unit;
    while end <= slot.end {
        subslots.push(SubSlot {
            parent: slot.id,
            start,
            end,
        });
        start = end;
        end = start + unit;
    }
    subslots
}

/// Partition each slot in turn, preserving the input order.
pub fn get_sub_slots_batch(slots: &[Slot], unit_minutes: u32) -> Vec<SubSlot> {
    slots
        .iter()
        .flat_map(|slot| get_sub_slots(slot, unit_minutes))
        .collect()
}

/// Whether `b`'s interval lies entirely within `a`'s. Reflexive.
pub fn is_super_slot(a: &impl TimeSpan, b: &impl TimeSpan) -> bool {
    interval::contains(a, b)
}

/// Immutably sort by start time. Descending is the reverse of ascending;
/// the underlying sort is stable.
pub fn order_slots<T: TimeSpan + Clone>(slots: &[T], order: SortOrder) -> Vec<T> {
    let mut sorted = slots.to_vec();
    sorted.sort_by_key(|slot| slot.span_start());
    if order == SortOrder::Desc {
        sorted.reverse();
    }
    sorted
}

/// Whether `target` overlaps at least one interval in `slots`. Touching
/// boundaries do not count.
pub fn is_intersecting(target: &impl TimeSpan, slots: &[impl TimeSpan]) -> bool {
    slots.iter().any(|slot| interval::overlaps(target, slot))
}

/// Subtract a slot's booked subslots from it, returning the remaining
/// bookable gaps in chronological order.
///
/// Only subslots that name this slot as parent and are contained in its
/// interval participate; anything else is ignored.
pub fn subtract_slots(slot: &Slot, subslots: &[SubSlot]) -> Vec<SubSlot> {
    let booked: Vec<&SubSlot> = subslots
        .iter()
        .filter(|subslot| subslot.parent == slot.id && interval::contains(slot, *subslot))
        .collect();

    interval::complement(slot, &booked)
        .into_iter()
        .map(|(start, end)| SubSlot {
            parent: slot.id,
            start,
            end,
        })
        .collect()
}

/// Subtract booked subslots from a batch of slots. Output preserves the
/// slots' order and, within each slot, chronological order of the gaps.
pub fn subtract_slots_batch(slots: &[Slot], subslots: &[SubSlot]) -> Vec<SubSlot> {
    slots
        .iter()
        .flat_map(|slot| subtract_slots(slot, subslots))
        .collect()
}

/// The booking-conflict guard: whether the requested interval can still
/// be booked in `slot` given the already-booked subslots.
///
/// True only when the candidate interval `[start, start + duration)` is
/// fully contained in the slot and overlaps none of the booked subslots.
pub fn can_book(slot: &Slot, booked: &[SubSlot], request: &BookingRequest) -> bool {
    interval::contains(slot, request)
        && !booked
            .iter()
            .any(|subslot| interval::overlaps(request, subslot))
}
