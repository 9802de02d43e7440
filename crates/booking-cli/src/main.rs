//! `booking` CLI — expand availability rules, check rule conflicts,
//! partition slots, and validate booking requests from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Expand a rule over a window (rule JSON from stdin)
//! cat rule.json | booking expand --start 2024-08-01T00:00:00Z --end 2024-08-15T00:00:00Z
//!
//! # Same, rendering event times in a timezone
//! booking expand -i rule.json --start 2024-08-01T00:00:00Z \
//!   --end 2024-08-15T00:00:00Z --timezone Africa/Cairo
//!
//! # Would two rules ever overlap?
//! booking conflicts --first rule_a.json --second rule_b.json
//!
//! # Divide slots into bookable 30-minute units
//! booking partition -i slots.json --unit 30
//!
//! # Remaining bookable gaps after subtracting booked subslots
//! booking gaps --slots slots.json --booked booked.json
//!
//! # Can this interval still be booked?
//! booking can-book --slot slot.json --booked booked.json \
//!   --start 2026-03-16T08:30:00Z --duration 30
//! ```

use anyhow::{Context, Result};
use booking_engine::expander::Event;
use booking_engine::rule::Rule;
use booking_engine::slot::{BookingRequest, Slot, SubSlot};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use std::io::{self, Read};

#[derive(Parser)]
#[command(name = "booking", version, about = "Recurring-availability and slot-booking engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a rule into concrete events within a window
    Expand {
        /// Rule JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Window start (RFC 3339 or naive UTC datetime)
        #[arg(long)]
        start: String,
        /// Window end (exclusive)
        #[arg(long)]
        end: String,
        /// JSON file with events to mask out of the expansion
        #[arg(long)]
        exclude: Option<String>,
        /// Render event times in this IANA timezone instead of UTC
        #[arg(long)]
        timezone: Option<String>,
    },
    /// Check whether two rules could ever produce overlapping events
    Conflicts {
        /// First rule JSON file
        #[arg(long)]
        first: String,
        /// Second rule JSON file
        #[arg(long)]
        second: String,
    },
    /// Divide slots into fixed-size bookable subslots
    Partition {
        /// Slots JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Subslot length in minutes
        #[arg(long)]
        unit: u32,
    },
    /// Remaining bookable gaps after subtracting booked subslots
    Gaps {
        /// Slots JSON file
        #[arg(long)]
        slots: String,
        /// Booked subslots JSON file
        #[arg(long)]
        booked: String,
    },
    /// Validate a booking request against a slot and its booked subslots
    CanBook {
        /// Slot JSON file
        #[arg(long)]
        slot: String,
        /// Booked subslots JSON file
        #[arg(long)]
        booked: String,
        /// Requested start (RFC 3339 or naive UTC datetime)
        #[arg(long)]
        start: String,
        /// Requested duration in minutes
        #[arg(long)]
        duration: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Expand {
            input,
            start,
            end,
            exclude,
            timezone,
        } => {
            let rule = parse_rule(&read_input(input.as_deref())?)?;
            let start = parse_datetime(&start)?;
            let end = parse_datetime(&end)?;
            let masks = match exclude {
                Some(path) => parse_events(&read_file(&path)?)?,
                None => Vec::new(),
            };

            let events = booking_engine::between(&rule, start, end, &masks);
            print_events(&events, timezone.as_deref())?;
        }
        Commands::Conflicts { first, second } => {
            let first = parse_rule(&read_file(&first)?)?;
            let second = parse_rule(&read_file(&second)?)?;
            println!(
                "intersecting: {}",
                booking_engine::intersecting(&first, &second)
            );
        }
        Commands::Partition { input, unit } => {
            let slots = parse_slots(&read_input(input.as_deref())?)?;
            let subslots = booking_engine::get_sub_slots_batch(&slots, unit);
            println!("{}", serde_json::to_string_pretty(&subslots)?);
        }
        Commands::Gaps { slots, booked } => {
            let slots = parse_slots(&read_file(&slots)?)?;
            let booked = parse_subslots(&read_file(&booked)?)?;
            let gaps = booking_engine::subtract_slots_batch(&slots, &booked);
            println!("{}", serde_json::to_string_pretty(&gaps)?);
        }
        Commands::CanBook {
            slot,
            booked,
            start,
            duration,
        } => {
            let slot = parse_slot(&read_file(&slot)?)?;
            let booked = parse_subslots(&read_file(&booked)?)?;
            let request = BookingRequest {
                start: parse_datetime(&start)?,
                duration,
            };
            println!(
                "bookable: {}",
                booking_engine::can_book(&slot, &booked, &request)
            );
        }
    }

    Ok(())
}

/// Print events as pretty JSON, optionally rendering the datetimes in a
/// target timezone. The engine works in UTC; conversion happens only here
/// at the display boundary.
fn print_events(events: &[Event], timezone: Option<&str>) -> Result<()> {
    match timezone {
        None => println!("{}", serde_json::to_string_pretty(events)?),
        Some(name) => {
            let tz: chrono_tz::Tz = name
                .parse()
                .map_err(|_| anyhow::anyhow!("Unknown timezone: {}", name))?;
            let localized: Vec<serde_json::Value> = events
                .iter()
                .map(|event| {
                    serde_json::json!({
                        "start": event.start.with_timezone(&tz).to_rfc3339(),
                        "end": event.end.with_timezone(&tz).to_rfc3339(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&localized)?);
        }
    }
    Ok(())
}

/// Parse an RFC 3339 datetime, or a naive `YYYY-MM-DDTHH:MM:SS`
/// interpreted as UTC.
fn parse_datetime(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .with_context(|| format!("Invalid datetime: {}", raw))
}

fn parse_rule(json: &str) -> Result<Rule> {
    let rule: Rule = serde_json::from_str(json).context("Failed to parse rule JSON")?;
    rule.validate()?;
    Ok(rule)
}

fn parse_slot(json: &str) -> Result<Slot> {
    let slot: Slot = serde_json::from_str(json).context("Failed to parse slot JSON")?;
    slot.validate()?;
    Ok(slot)
}

fn parse_slots(json: &str) -> Result<Vec<Slot>> {
    let slots: Vec<Slot> = serde_json::from_str(json).context("Failed to parse slots JSON")?;
    for slot in &slots {
        slot.validate()?;
    }
    Ok(slots)
}

fn parse_subslots(json: &str) -> Result<Vec<SubSlot>> {
    serde_json::from_str(json).context("Failed to parse subslots JSON")
}

fn parse_events(json: &str) -> Result<Vec<Event>> {
    serde_json::from_str(json).context("Failed to parse events JSON")
}

fn read_file(path: &str) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => read_file(path),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
