//! # Scan Output Parser
//!
//! Turns the semi-structured text of a ping sweep into [`PresenceRecord`]s.
//!
//! The parser never fails. Unusable input degrades the result instead:
//! * no banner timestamp → "now" in the configured zone plus
//!   [`ParseWarning::TimestampFallback`],
//! * empty output → no records plus [`ParseWarning::NoOutput`],
//! * malformed addresses → the affected host is skipped.
//!
//! Host lines go through a two-state machine (seeking a host, host pending). A
//! `scan report for` line arms it with an address. The address is only
//! recorded if the very next line confirms `Host is up`.

use std::fmt;
use std::net::Ipv4Addr;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use lanpulse_common::reading::{LatestReading, PresenceRecord};
use regex::Regex;

use crate::artifact::ScanArtifact;
use crate::error::ScanError;
use crate::scanner::RawScanOutput;

const BANNER_PREFIX: &str = "starting";
const BANNER_SEPARATOR: &str = " at ";
const SCAN_REPORT_MARKER: &str = "scan report for";
const HOST_UP_MARKER: &str = "host is up";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

static IPV4_PATTERN: OnceLock<Regex> = OnceLock::new();

fn ipv4_pattern() -> &'static Regex {
    IPV4_PATTERN.get_or_init(|| {
        Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("IPv4 pattern is a valid regex")
    })
}

/// Non-fatal conditions met while parsing. Callers log them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseWarning {
    /// No usable banner timestamp; `observed_at` is the parse time.
    TimestampFallback,
    /// The tool produced no output at all.
    NoOutput,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::TimestampFallback => {
                f.write_str("could not find scan time in scan output, using now")
            }
            ParseWarning::NoOutput => f.write_str("got no output from the scan tool"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScan {
    pub observed_at: DateTime<FixedOffset>,
    pub records: Vec<PresenceRecord>,
    pub warnings: Vec<ParseWarning>,
}

impl ParsedScan {
    pub fn has_warning(&self, warning: ParseWarning) -> bool {
        self.warnings.contains(&warning)
    }

    pub fn into_reading(self) -> LatestReading {
        LatestReading::new(self.observed_at, self.records)
    }
}

/// Parses `raw`, falling back to the current time when the banner is unusable.
pub fn parse(raw: &RawScanOutput, tz: Tz) -> ParsedScan {
    parse_at(raw, tz, Utc::now())
}

/// Same as [`parse`], with `now` as the fallback timestamp.
pub fn parse_at(raw: &RawScanOutput, tz: Tz, now: DateTime<Utc>) -> ParsedScan {
    let fallback = now.with_timezone(&tz).fixed_offset();

    if raw.is_empty() {
        return ParsedScan {
            observed_at: fallback,
            records: Vec::new(),
            warnings: vec![ParseWarning::NoOutput],
        };
    }

    let mut warnings = Vec::new();
    let observed_at = match scan_start_time(raw.as_str(), tz) {
        Some(start) => start,
        None => {
            warnings.push(ParseWarning::TimestampFallback);
            fallback
        }
    };

    let records = live_hosts(raw.as_str())
        .into_iter()
        .map(|address| PresenceRecord::up(address, observed_at))
        .collect();

    ParsedScan {
        observed_at,
        records,
        warnings,
    }
}

/// Re-parses the raw output persisted by the last scan.
pub async fn parse_artifact(artifact: &ScanArtifact, tz: Tz) -> Result<ParsedScan, ScanError> {
    let raw = artifact.load().await?;
    Ok(parse(&raw, tz))
}

/// Resolves the start time announced by the first `Starting ... at <time>` line.
fn scan_start_time(text: &str, tz: Tz) -> Option<DateTime<FixedOffset>> {
    let banner = text.lines().map(str::trim).find(|line| {
        line.to_ascii_lowercase().starts_with(BANNER_PREFIX) && line.contains(BANNER_SEPARATOR)
    })?;
    let (_, stamp) = banner.rsplit_once(BANNER_SEPARATOR)?;
    parse_timestamp(stamp.trim(), tz)
}

/// Reads a banner timestamp such as `2024-01-01 12:00 UTC` into `tz`.
///
/// A zone token that is neither UTC, a numeric offset nor an IANA name
/// (e.g. a Windows zone such as `W. Europe Standard Time`) is ignored and the
/// wall time is read in `tz`.
fn parse_timestamp(stamp: &str, tz: Tz) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(stamp) {
        return Some(dt.with_timezone(&tz).fixed_offset());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(stamp) {
        return Some(dt.with_timezone(&tz).fixed_offset());
    }

    let mut tokens = stamp.split_whitespace();
    let date = tokens.next()?;
    let (naive, zone) = match tokens.next() {
        Some(time) => match parse_naive(&format!("{date} {time}")) {
            Some(naive) => (naive, tokens.next()),
            None => (parse_naive(date)?, Some(time)),
        },
        None => (parse_naive(date)?, None),
    };

    let resolved = match zone {
        Some(zone) if is_utc(zone) => Utc.from_utc_datetime(&naive).with_timezone(&tz),
        Some(zone) => match parse_offset(zone) {
            Some(offset) => offset.from_local_datetime(&naive).single()?.with_timezone(&tz),
            None => match zone.parse::<Tz>() {
                Ok(named) => named.from_local_datetime(&naive).earliest()?.with_timezone(&tz),
                Err(_) => tz.from_local_datetime(&naive).earliest()?,
            },
        },
        None => tz.from_local_datetime(&naive).earliest()?,
    };

    Some(resolved.fixed_offset())
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn is_utc(zone: &str) -> bool {
    matches!(zone.to_ascii_uppercase().as_str(), "UTC" | "GMT" | "Z")
}

/// Parses `+01`, `+0100` or `+01:00` style offsets.
fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let (sign, digits) = match zone.as_bytes().first()? {
        b'+' => (1, &zone[1..]),
        b'-' => (-1, &zone[1..]),
        _ => return None,
    };
    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Position of the host machine between lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostState {
    SeekingHost,
    HostPending(Ipv4Addr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostLine {
    /// A `scan report for` line; `None` when it holds no usable address.
    ScanReport(Option<Ipv4Addr>),
    HostUp,
    Other,
}

fn classify(line: &str) -> HostLine {
    let lower = line.to_ascii_lowercase();

    if let Some(idx) = lower.find(SCAN_REPORT_MARKER) {
        let remainder = &line[idx + SCAN_REPORT_MARKER.len()..];
        return HostLine::ScanReport(find_ipv4(remainder));
    }

    if lower.contains(HOST_UP_MARKER) {
        return HostLine::HostUp;
    }

    HostLine::Other
}

/// Single transition function of the host machine. Returns the next state and
/// the address confirmed by this line, if any.
fn step(state: HostState, line: HostLine) -> (HostState, Option<Ipv4Addr>) {
    match (state, line) {
        (_, HostLine::ScanReport(Some(address))) => (HostState::HostPending(address), None),
        (_, HostLine::ScanReport(None)) => (HostState::SeekingHost, None),
        (HostState::HostPending(address), HostLine::HostUp) => {
            (HostState::SeekingHost, Some(address))
        }
        (_, HostLine::HostUp | HostLine::Other) => (HostState::SeekingHost, None),
    }
}

fn live_hosts(text: &str) -> Vec<Ipv4Addr> {
    let mut state = HostState::SeekingHost;
    let mut hosts = Vec::new();

    for line in text.lines() {
        let (next, confirmed) = step(state, classify(line));
        hosts.extend(confirmed);
        state = next;
    }

    hosts
}

/// First token in `text` that is shaped like, and parses as, an IPv4 address.
fn find_ipv4(text: &str) -> Option<Ipv4Addr> {
    ipv4_pattern()
        .find_iter(text)
        .find_map(|m| m.as_str().parse::<Ipv4Addr>().ok())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
