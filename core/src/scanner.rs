//! The **abstraction** over the external scanning tool.
//!
//! The scheduler depends on the [`ScanRunner`] trait only. The concrete
//! [`ToolScanner`] shells out to `nmap -sn`, but anything producing the same
//! stdout contract (a `Starting ... at <time>` banner, `scan report for ADDR`
//! lines, `Host is up` confirmations) can stand in for it.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ScanError;

mod tool;

pub use tool::ToolScanner;

/// The unmodified stdout of one scan tool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawScanOutput(String);

impl RawScanOutput {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the tool produced nothing but whitespace.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for RawScanOutput {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RawScanOutput {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Runs one liveness sweep over an address range.
#[async_trait]
pub trait ScanRunner: Send + Sync {
    /// Scans `target_range` and returns the tool's raw output.
    ///
    /// Fails with [`ScanError::ToolInvocation`] when the tool cannot be
    /// launched or exits unsuccessfully, and with [`ScanError::ToolTimeout`]
    /// when it runs past its time bound.
    async fn run_scan(&self, target_range: &str) -> Result<RawScanOutput, ScanError>;
}

/// Resolves `tool` on the execution path. Meant to run once, at startup.
pub fn check_preconditions(tool: &str) -> Result<PathBuf, ScanError> {
    let resolved = which::which(tool).map_err(|source| ScanError::Precondition {
        tool: tool.to_string(),
        source,
    })?;
    debug!(tool, path = %resolved.display(), "Scan tool found");
    Ok(resolved)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
