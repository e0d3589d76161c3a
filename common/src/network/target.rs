//! # Scan Target Model
//!
//! Defines the address ranges the sensor may hand to the scan tool.
//!
//! A target can be:
//! * A single IPv4 address (host).
//! * An IPv4 range within one /24 (e.g., `192.168.1.1-100`).
//! * A CIDR block (e.g., `192.168.1.0/24`).
//!
//! Parsing happens once, when the configuration is loaded, so that a typo in
//! the subnet fails at startup instead of on every scan cycle.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use ipnetwork::Ipv4Network;

use crate::network::range::{self, Ipv4Range};

/// A validated address range, rendered in the scan tool's target syntax.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanTarget {
    /// Scan a single specific host.
    Host { target_addr: Ipv4Addr },
    /// Scan a range of IPv4 addresses sharing the first three octets.
    Range { ipv4_range: Ipv4Range },
    /// Scan a CIDR block.
    Cidr { network: Ipv4Network },
}

impl ScanTarget {
    /// Number of addresses the scan tool will sweep.
    pub fn len(&self) -> u64 {
        match self {
            ScanTarget::Host { .. } => 1,
            ScanTarget::Range { ipv4_range } => ipv4_range.len(),
            ScanTarget::Cidr { network } => 1u64 << (32 - u32::from(network.prefix())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanTarget::Host { target_addr } => write!(f, "{target_addr}"),
            ScanTarget::Range { ipv4_range } => {
                let end = ipv4_range.end_addr.octets()[3];
                write!(f, "{}-{end}", ipv4_range.start_addr)
            }
            ScanTarget::Cidr { network } => write!(f, "{}/{}", network.ip(), network.prefix()),
        }
    }
}

impl FromStr for ScanTarget {
    type Err = String;

    /// Parses a string into a `ScanTarget`.
    ///
    /// Supported formats:
    /// * **Host**: Single IPv4 address (e.g., "192.168.1.5").
    /// * **Range**: "Start-End" (e.g., "192.168.1.1-50", "192.168.1.1-192.168.1.50").
    /// * **CIDR**: "Network/Prefix" (e.g., "192.168.1.0/24").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(target) = parse_host(s) {
            return Ok(target);
        }

        if let Some(target) = parse_ip_range(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_cidr_range(s)? {
            return Ok(target);
        }

        Err(format!("invalid target: {s}"))
    }
}

/// Parses a single IP address.
fn parse_host(s: &str) -> Option<ScanTarget> {
    s.parse::<Ipv4Addr>()
        .ok()
        .map(|target_addr| ScanTarget::Host { target_addr })
}

/// Parses a range string like "1.1.1.1-1.1.1.9" or "1.1.1.1-9".
fn parse_ip_range(s: &str) -> Result<Option<ScanTarget>, String> {
    let Some((start_str, end_str)) = s.split_once('-') else {
        return Ok(None);
    };

    let start_addr = start_str
        .parse::<Ipv4Addr>()
        .map_err(|e| format!("Invalid start IP in range '{start_str}': {e}"))?;

    let end_addr = parse_range_end_addr(end_str, &start_addr, s)?;

    let ipv4_range = Ipv4Range::new(start_addr, end_addr);
    if !ipv4_range.is_last_octet_range() {
        return Err(format!(
            "Range '{s}' must stay within one /24 and end after it starts"
        ));
    }

    Ok(Some(ScanTarget::Range { ipv4_range }))
}

/// Helper to parse the end address of a range.
///
/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(
    end_str: &str,
    start_addr: &Ipv4Addr,
    original_s: &str,
) -> Result<Ipv4Addr, String> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    if end_str.is_empty() {
        return Err(format!("End range cannot be empty: {original_s}"));
    }

    let last_octet = end_str
        .parse::<u8>()
        .map_err(|e| format!("Invalid end range '{end_str}': {e}"))?;

    let mut end_octets = start_addr.octets();
    end_octets[3] = last_octet;

    Ok(Ipv4Addr::from(end_octets))
}

/// Parses CIDR notation like "192.168.1.0/24".
fn parse_cidr_range(s: &str) -> Result<Option<ScanTarget>, String> {
    let Some((ip_str, prefix_str)) = s.split_once('/') else {
        return Ok(None);
    };

    let ipv4_addr = ip_str
        .parse::<Ipv4Addr>()
        .map_err(|e| format!("Invalid IP in CIDR '{ip_str}': {e}"))?;

    let prefix = prefix_str
        .parse::<u8>()
        .map_err(|e| format!("Invalid prefix in CIDR '{prefix_str}': {e}"))?;

    let network = range::cidr_network(ipv4_addr, prefix).map_err(|e| e.to_string())?;

    Ok(Some(ScanTarget::Cidr { network }))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
