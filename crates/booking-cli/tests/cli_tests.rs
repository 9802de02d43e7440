//! Integration tests for the `booking` CLI binary.
//!
//! These use `assert_cmd` and `predicates` to exercise the expand,
//! conflicts, partition, gaps, and can-book subcommands through the
//! actual binary, including stdin piping and JSON fixtures.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: absolute path to a fixture file.
fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn fixture_contents(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).expect("fixture must exist")
}

// ─────────────────────────────────────────────────────────────────────────────
// Expand subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn expand_rule_from_stdin() {
    Command::cargo_bin("booking")
        .unwrap()
        .args([
            "expand",
            "--start",
            "2024-08-11T00:00:00Z",
            "--end",
            "2024-08-13T00:00:00Z",
        ])
        .write_stdin(fixture_contents("daily_rule.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-08-11T12:00:00Z"))
        .stdout(predicate::str::contains("2024-08-12T12:00:00Z"));
}

#[test]
fn expand_rule_from_file_with_exclusions() {
    Command::cargo_bin("booking")
        .unwrap()
        .args([
            "expand",
            "-i",
            fixture("daily_rule.json").as_str(),
            "--start",
            "2024-08-11T00:00:00Z",
            "--end",
            "2024-08-12T00:00:00Z",
            "--exclude",
            fixture("exclude.json").as_str(),
        ])
        .assert()
        .success()
        // The booked first half hour is masked out of the occurrence.
        .stdout(predicate::str::contains("\"start\": \"2024-08-11T12:30:00Z\""))
        .stdout(predicate::str::contains("\"start\": \"2024-08-11T12:00:00Z\"").not());
}

#[test]
fn expand_renders_times_in_a_timezone() {
    // Cairo is UTC+3 in August; noon UTC becomes 15:00 local.
    Command::cargo_bin("booking")
        .unwrap()
        .args([
            "expand",
            "-i",
            fixture("daily_rule.json").as_str(),
            "--start",
            "2024-08-11T00:00:00Z",
            "--end",
            "2024-08-12T00:00:00Z",
            "--timezone",
            "Africa/Cairo",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("15:00:00+03:00"));
}

#[test]
fn expand_rejects_an_invalid_rule() {
    let invalid = r#"{
        "id": 1,
        "frequency": "daily",
        "start": "2024-08-01T00:00:00Z",
        "end": "2024-08-30T00:00:00Z",
        "time": { "hour": 12, "minute": 0 },
        "duration": 0,
        "owner": 7
    }"#;

    Command::cargo_bin("booking")
        .unwrap()
        .args([
            "expand",
            "--start",
            "2024-08-11T00:00:00Z",
            "--end",
            "2024-08-13T00:00:00Z",
        ])
        .write_stdin(invalid)
        .assert()
        .failure()
        .stderr(predicate::str::contains("duration"));
}

#[test]
fn expand_rejects_an_unknown_timezone() {
    Command::cargo_bin("booking")
        .unwrap()
        .args([
            "expand",
            "-i",
            fixture("daily_rule.json").as_str(),
            "--start",
            "2024-08-11T00:00:00Z",
            "--end",
            "2024-08-12T00:00:00Z",
            "--timezone",
            "Mars/Olympus_Mons",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown timezone"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Conflicts subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn conflicts_detects_overlapping_rules() {
    Command::cargo_bin("booking")
        .unwrap()
        .args([
            "conflicts",
            "--first",
            fixture("daily_rule.json").as_str(),
            "--second",
            fixture("overlapping_rule.json").as_str(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("intersecting: true"));
}

#[test]
fn conflicts_allows_touching_times() {
    // 12:00-13:00 against 13:00-14:00 every day — adjacent, no conflict.
    Command::cargo_bin("booking")
        .unwrap()
        .args([
            "conflicts",
            "--first",
            fixture("daily_rule.json").as_str(),
            "--second",
            fixture("shifted_rule.json").as_str(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("intersecting: false"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Partition and gaps subcommands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn partition_divides_slots_into_units() {
    Command::cargo_bin("booking")
        .unwrap()
        .args(["partition", "-i", fixture("slots.json").as_str(), "--unit", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"start\": \"2026-03-16T08:30:00Z\""))
        .stdout(predicate::str::contains("\"start\": \"2026-03-16T09:30:00Z\""));
}

#[test]
fn gaps_subtracts_booked_subslots() {
    Command::cargo_bin("booking")
        .unwrap()
        .args([
            "gaps",
            "--slots",
            fixture("slots.json").as_str(),
            "--booked",
            fixture("booked.json").as_str(),
        ])
        .assert()
        .success()
        // Slot 2 keeps [09:00, 09:10) and [09:25, 10:00).
        .stdout(predicate::str::contains("\"start\": \"2026-03-16T09:25:00Z\""))
        // Slot 1's booked back half never shows up as a gap start.
        .stdout(predicate::str::contains("\"start\": \"2026-03-16T08:30:00Z\"").not());
}

// ─────────────────────────────────────────────────────────────────────────────
// Can-book subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn can_book_accepts_a_free_interval() {
    Command::cargo_bin("booking")
        .unwrap()
        .args([
            "can-book",
            "--slot",
            fixture("slot.json").as_str(),
            "--booked",
            fixture("slot_booked.json").as_str(),
            "--start",
            "2026-03-16T08:30:00Z",
            "--duration",
            "30",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("bookable: true"));
}

#[test]
fn can_book_rejects_a_clashing_interval() {
    Command::cargo_bin("booking")
        .unwrap()
        .args([
            "can-book",
            "--slot",
            fixture("slot.json").as_str(),
            "--booked",
            fixture("slot_booked.json").as_str(),
            "--start",
            "2026-03-16T08:15:00Z",
            "--duration",
            "30",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("bookable: false"));
}
