use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan tool cannot be resolved on `PATH`. Only raised at startup.
    #[error("'{tool}' seems not to be installed or on the path")]
    Precondition {
        tool: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to invoke '{tool}'")]
    ToolInvocation {
        tool: String,
        #[source]
        failure: InvocationFailure,
    },

    #[error("'{tool}' did not finish within {}s", timeout.as_secs())]
    ToolTimeout { tool: String, timeout: Duration },

    #[error("cannot access scan artifact {}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum InvocationFailure {
    #[error("could not launch process")]
    Launch(#[source] std::io::Error),
    #[error("exited with {status}: {stderr}")]
    Exit { status: ExitStatus, stderr: String },
}

impl ScanError {
    /// Errors the scheduler contains within a single cycle.
    pub fn is_per_cycle(&self) -> bool {
        !matches!(self, ScanError::Precondition { .. })
    }
}
