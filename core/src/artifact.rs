//! Fixed-location copy of the last raw scan output.
//!
//! The file lets the reading be recomputed without rerunning the scan, for
//! example by `lanpulse read` from a separate process.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ScanError;
use crate::scanner::RawScanOutput;

#[derive(Debug, Clone)]
pub struct ScanArtifact {
    path: PathBuf,
}

impl ScanArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the artifact. The output is staged next to the target and
    /// renamed over it, so a concurrent reader never sees a half-written file.
    pub async fn store(&self, output: &RawScanOutput) -> Result<(), ScanError> {
        let staging = self.path.with_extension("out.partial");

        tokio::fs::write(&staging, output.as_str())
            .await
            .map_err(|source| self.error(source))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|source| self.error(source))?;

        debug!(path = %self.path.display(), bytes = output.len(), "Stored raw scan output");
        Ok(())
    }

    pub async fn load(&self) -> Result<RawScanOutput, ScanError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| self.error(source))?;
        Ok(RawScanOutput::from(text))
    }

    fn error(&self, source: std::io::Error) -> ScanError {
        ScanError::Artifact {
            path: self.path.clone(),
            source,
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_then_load_replaces_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ScanArtifact::new(dir.path().join("scan.out"));

        artifact.store(&RawScanOutput::from("first run\n")).await.unwrap();
        artifact.store(&RawScanOutput::from("second run\n")).await.unwrap();

        let loaded = artifact.load().await.unwrap();
        assert_eq!(loaded.as_str(), "second run\n");
        assert!(!dir.path().join("scan.out.partial").exists());
    }

    #[tokio::test]
    async fn load_of_missing_file_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = ScanArtifact::new(dir.path().join("absent.out"));
        assert_eq!(artifact.path(), dir.path().join("absent.out"));

        let err = artifact.load().await.unwrap_err();
        assert!(matches!(err, ScanError::Artifact { .. }));
    }
}
