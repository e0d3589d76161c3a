//! Liveness sweep through an **external scan tool** (`nmap -sn` by default).
//!
//! The tool runs as a child process bounded by a timeout. When the bound is
//! hit the pending future is dropped and `kill_on_drop` reaps the child, so a
//! hung scan cannot stall the scheduler.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use lanpulse_common::config::ScanConfiguration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::artifact::ScanArtifact;
use crate::error::{InvocationFailure, ScanError};

use super::{RawScanOutput, ScanRunner};

/// Ping-sweep flag: host discovery only, no port scan.
const DISCOVERY_FLAG: &str = "-sn";

#[derive(Debug, Clone)]
pub struct ToolScanner {
    tool: String,
    timeout: Duration,
    artifact: Option<ScanArtifact>,
}

impl ToolScanner {
    pub fn new(tool: impl Into<String>, timeout: Duration) -> Self {
        Self {
            tool: tool.into(),
            timeout,
            artifact: None,
        }
    }

    /// Builds a scanner persisting its output to the configured artifact path.
    pub fn from_config(cfg: &ScanConfiguration) -> Self {
        Self::new(cfg.tool.clone(), cfg.scan_timeout)
            .with_artifact(ScanArtifact::new(cfg.artifact_path()))
    }

    pub fn with_artifact(mut self, artifact: ScanArtifact) -> Self {
        self.artifact = Some(artifact);
        self
    }

    fn invocation_error(&self, failure: InvocationFailure) -> ScanError {
        ScanError::ToolInvocation {
            tool: self.tool.clone(),
            failure,
        }
    }
}

#[async_trait]
impl ScanRunner for ToolScanner {
    async fn run_scan(&self, target_range: &str) -> Result<RawScanOutput, ScanError> {
        debug!(tool = %self.tool, range = target_range, "Calling scan tool");

        let child = Command::new(&self.tool)
            .arg(DISCOVERY_FLAG)
            .arg(target_range)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.invocation_error(InvocationFailure::Launch(e)))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| self.invocation_error(InvocationFailure::Launch(e)))?,
            Err(_) => {
                return Err(ScanError::ToolTimeout {
                    tool: self.tool.clone(),
                    timeout: self.timeout,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(self.invocation_error(InvocationFailure::Exit {
                status: output.status,
                stderr,
            }));
        }

        let raw = RawScanOutput::from(String::from_utf8_lossy(&output.stdout).into_owned());
        debug!(bytes = raw.len(), "Scan tool finished");

        if let Some(artifact) = &self.artifact
            && let Err(e) = artifact.store(&raw).await
        {
            warn!("Could not persist raw scan output: {e}");
        }

        Ok(raw)
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
