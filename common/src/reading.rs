//! Presence records and the reading handed to the aggregation pipeline.
//!
//! The pipeline reads a flat sequence of [`Observation`]s. Their field names
//! (`observable_id`, `time_seen`, `value`, `observations.source`) are the
//! collector's schema and are kept exactly as the collector expects them.

use std::net::Ipv4Addr;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Serialize, Serializer};

/// Value of a record stating that a host answered the ping sweep.
pub const HOST_UP: u8 = 1;

/// Source tag attached to every record produced by the scan pipeline.
pub const SCAN_SOURCE: &str = "scan";

/// One observation that `address` responded to the ping sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRecord {
    pub address: Ipv4Addr,
    /// Start of the scan that saw the host, shared by every record of that scan.
    pub observed_at: DateTime<FixedOffset>,
    pub value: u8,
    pub source: String,
}

impl PresenceRecord {
    pub fn up(address: Ipv4Addr, observed_at: DateTime<FixedOffset>) -> Self {
        Self {
            address,
            observed_at,
            value: HOST_UP,
            source: SCAN_SOURCE.to_string(),
        }
    }

    pub fn to_observation(&self) -> Observation {
        Observation {
            observable_id: self.address.to_string(),
            time_seen: self.observed_at,
            value: self.value,
            observations: ObservationSource {
                source: self.source.clone(),
            },
        }
    }
}

/// The most recent completed scan. Replaced as a whole, never appended to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestReading {
    /// `None` until the first scan has been stored.
    pub observed_at: Option<DateTime<FixedOffset>>,
    pub records: Vec<PresenceRecord>,
}

impl LatestReading {
    pub fn new(observed_at: DateTime<FixedOffset>, records: Vec<PresenceRecord>) -> Self {
        Self {
            observed_at: Some(observed_at),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.records
            .iter()
            .map(PresenceRecord::to_observation)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub observable_id: String,
    #[serde(serialize_with = "serialize_time_seen")]
    pub time_seen: DateTime<FixedOffset>,
    pub value: u8,
    pub observations: ObservationSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservationSource {
    pub source: String,
}

/// RFC 3339 with whole seconds and a numeric offset, `+00:00` rather than `Z` for UTC.
fn serialize_time_seen<S>(time_seen: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time_seen.to_rfc3339_opts(SecondsFormat::Secs, false))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
