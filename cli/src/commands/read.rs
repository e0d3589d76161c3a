use lanpulse_common::config::ScanConfiguration;
use lanpulse_core::artifact::ScanArtifact;
use lanpulse_core::parser;
use tracing::{info, warn};

use super::print_reading;

pub async fn read(cfg: &ScanConfiguration) -> anyhow::Result<()> {
    let artifact = ScanArtifact::new(cfg.artifact_path());
    info!("Reading latest scan output from {}", artifact.path().display());

    let parsed = parser::parse_artifact(&artifact, cfg.timezone).await?;
    for warning in &parsed.warnings {
        warn!("{warning}");
    }

    print_reading(&parsed.into_reading())
}
