//! WASM bindings for booking-engine.
//!
//! Exposes rule expansion, rule conflict checking, slot subtraction, and
//! booking validation to JavaScript via `wasm-bindgen`. Complex types
//! cross the boundary as JSON strings in the same shape the core types
//! serialize to, so a JavaScript caller round-trips data unchanged.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p booking-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/booking-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/booking_engine_wasm.wasm
//! ```

use booking_engine::expander::Event;
use booking_engine::rule::Rule;
use booking_engine::slot::{BookingRequest, Slot, SubSlot};
use chrono::{DateTime, NaiveDateTime, Utc};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Input parsing helpers
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts both RFC 3339 (with timezone offset, e.g., "2026-02-17T14:00:00Z")
/// and naive local time (e.g., "2026-02-17T14:00:00"), which is interpreted
/// as UTC.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, JsValue> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| JsValue::from_str(&format!("Invalid datetime '{}': {}", s, e)))
}

/// Parse and validate a rule from its JSON representation.
fn parse_rule(json: &str) -> Result<Rule, JsValue> {
    let rule: Rule = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid rule JSON: {}", e)))?;
    rule.validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(rule)
}

/// Parse and validate a JSON array of slots.
fn parse_slots(json: &str) -> Result<Vec<Slot>, JsValue> {
    let slots: Vec<Slot> = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid slots JSON: {}", e)))?;
    for slot in &slots {
        slot.validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
    }
    Ok(slots)
}

fn parse_subslots(json: &str) -> Result<Vec<SubSlot>, JsValue> {
    serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid subslots JSON: {}", e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Expand a rule into concrete events within `[window_start, window_end)`.
///
/// `rule_json` is the serialized rule; `exclude_json` is an optional JSON
/// array of `{start, end}` events to mask out of the expansion. Returns a
/// JSON array of `{start, end}` events with RFC 3339 datetimes.
#[wasm_bindgen(js_name = "expandRule")]
pub fn expand_rule(
    rule_json: &str,
    window_start: &str,
    window_end: &str,
    exclude_json: Option<String>,
) -> Result<String, JsValue> {
    let rule = parse_rule(rule_json)?;
    let start = parse_datetime(window_start)?;
    let end = parse_datetime(window_end)?;
    let exclude: Vec<Event> = match exclude_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| JsValue::from_str(&format!("Invalid exclude JSON: {}", e)))?,
        None => Vec::new(),
    };

    let events = booking_engine::between(&rule, start, end, &exclude);
    to_json(&events)
}

/// Whether two rules are capable of ever producing overlapping events.
///
/// Both arguments are serialized rules; both are validated before the
/// check runs.
#[wasm_bindgen(js_name = "rulesIntersecting")]
pub fn rules_intersecting(first_json: &str, second_json: &str) -> Result<bool, JsValue> {
    let first = parse_rule(first_json)?;
    let second = parse_rule(second_json)?;
    Ok(booking_engine::intersecting(&first, &second))
}

/// Subtract booked subslots from a batch of slots, returning the
/// remaining bookable gaps as a JSON array of subslots.
#[wasm_bindgen(js_name = "availableSubSlots")]
pub fn available_sub_slots(slots_json: &str, booked_json: &str) -> Result<String, JsValue> {
    let slots = parse_slots(slots_json)?;
    let booked = parse_subslots(booked_json)?;

    let gaps = booking_engine::subtract_slots_batch(&slots, &booked);
    to_json(&gaps)
}

/// Whether the requested interval can still be booked in the slot.
///
/// `slot_json` is one serialized slot, `booked_json` a JSON array of its
/// already-booked subslots, `start` the requested start datetime, and
/// `duration_minutes` the requested length.
#[wasm_bindgen(js_name = "canBook")]
pub fn can_book(
    slot_json: &str,
    booked_json: &str,
    start: &str,
    duration_minutes: u32,
) -> Result<bool, JsValue> {
    let slot: Slot = serde_json::from_str(slot_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid slot JSON: {}", e)))?;
    slot.validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let booked = parse_subslots(booked_json)?;
    let request = BookingRequest {
        start: parse_datetime(start)?,
        duration: duration_minutes,
    };

    Ok(booking_engine::can_book(&slot, &booked, &request))
}
