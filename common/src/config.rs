//! Per-run scan settings.
//!
//! A [`ScanConfiguration`] is built once at process start and passed by
//! reference to the executor and the scheduler. Nothing mutates it afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use thiserror::Error;

use crate::network::target::ScanTarget;

pub const DEFAULT_SUBNET_RANGE: &str = "192.168.1.0/24";
pub const DEFAULT_INTERVAL_SECONDS: u64 = 300;
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_SCAN_TOOL: &str = "nmap";
pub const DEFAULT_SCAN_TIMEOUT_SECONDS: u64 = 120;

/// File name of the raw scan output inside the temporary directory.
pub const ARTIFACT_FILE_NAME: &str = "aileen-lan-nmap.out";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid subnet range '{value}': {reason}")]
    SubnetRange { value: String, reason: String },
    #[error("unknown timezone '{0}'")]
    Timezone(String),
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
    #[error("scan tool name cannot be empty")]
    EmptyTool,
}

#[derive(Debug, Clone)]
pub struct ScanConfiguration {
    /// Address range handed to the scan tool.
    pub target: ScanTarget,
    /// Period of the scan cycle grid.
    pub interval: Duration,
    /// Zone used to read banner timestamps and to report `time_seen`.
    pub timezone: Tz,
    /// Name or path of the scan tool binary.
    pub tool: String,
    /// Upper bound on a single scan; the tool is killed once it is exceeded.
    pub scan_timeout: Duration,
    /// Directory holding the raw scan artifact.
    pub tmp_dir: PathBuf,
}

impl ScanConfiguration {
    pub fn new(
        subnet_range: &str,
        interval_seconds: u64,
        timezone: &str,
    ) -> Result<Self, ConfigError> {
        let target = subnet_range
            .parse::<ScanTarget>()
            .map_err(|reason| ConfigError::SubnetRange {
                value: subnet_range.to_string(),
                reason,
            })?;

        let timezone = timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| ConfigError::Timezone(timezone.to_string()))?;

        if interval_seconds == 0 {
            return Err(ConfigError::ZeroDuration { field: "interval" });
        }

        Ok(Self {
            target,
            interval: Duration::from_secs(interval_seconds),
            timezone,
            tool: DEFAULT_SCAN_TOOL.to_string(),
            scan_timeout: Duration::from_secs(DEFAULT_SCAN_TIMEOUT_SECONDS),
            tmp_dir: std::env::temp_dir(),
        })
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Result<Self, ConfigError> {
        let tool = tool.into();
        if tool.trim().is_empty() {
            return Err(ConfigError::EmptyTool);
        }
        self.tool = tool;
        Ok(self)
    }

    pub fn with_scan_timeout(mut self, timeout_seconds: u64) -> Result<Self, ConfigError> {
        if timeout_seconds == 0 {
            return Err(ConfigError::ZeroDuration { field: "scan timeout" });
        }
        self.scan_timeout = Duration::from_secs(timeout_seconds);
        Ok(self)
    }

    pub fn with_tmp_dir(mut self, tmp_dir: impl AsRef<Path>) -> Self {
        self.tmp_dir = tmp_dir.as_ref().to_path_buf();
        self
    }

    /// Location of the raw output of the most recent scan.
    pub fn artifact_path(&self) -> PathBuf {
        self.tmp_dir.join(ARTIFACT_FILE_NAME)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
