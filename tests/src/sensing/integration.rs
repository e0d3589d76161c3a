#![cfg(unix)]
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use lanpulse_common::config::ScanConfiguration;
use lanpulse_core::artifact::ScanArtifact;
use lanpulse_core::parser;
use lanpulse_core::scanner::ToolScanner;
use lanpulse_core::scheduler::{CycleOutcome, Scheduler};
use lanpulse_core::store::{LatestReadingStore, ReadingStore};
use lanpulse_core::ScanError;

use crate::utils::FakeTool;

const HOME_LAN: &str = "\
Starting Nmap 7.80 ( https://nmap.org ) at 2024-01-01 12:00 UTC
Nmap scan report for 192.168.1.5
Host is up (0.01s latency).
Nmap scan report for 192.168.1.9
Nmap done: 256 IP addresses (1 host up) scanned in 2.04 seconds
";

fn sensor_config(dir: &std::path::Path, tool: &FakeTool) -> ScanConfiguration {
    ScanConfiguration::new("192.168.1.0/24", 60, "UTC")
        .unwrap()
        .with_tool(tool.name())
        .unwrap()
        .with_scan_timeout(2)
        .unwrap()
        .with_tmp_dir(dir)
}

fn scheduler_for(cfg: &ScanConfiguration, store: Arc<LatestReadingStore>) -> Scheduler {
    let runner = Box::new(ToolScanner::from_config(cfg));
    Scheduler::new(cfg.clone(), runner, store)
}

/// The tool output is turned into exactly one observation, in the collector's schema.
#[tokio::test]
async fn scan_cycle_publishes_collector_observations() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let tool = FakeTool::printing(dir.path(), HOME_LAN);
    let cfg = sensor_config(dir.path(), &tool);
    let store = Arc::new(LatestReadingStore::new());

    let outcome = scheduler_for(&cfg, store.clone()).run_cycle().await;
    assert!(matches!(outcome, CycleOutcome::Stored { hosts: 1 }));

    let reading = store.read();
    assert_eq!(reading.records[0].address, Ipv4Addr::new(192, 168, 1, 5));

    let json = serde_json::to_value(store.observations())?;
    assert_eq!(
        json,
        serde_json::json!([{
            "observable_id": "192.168.1.5",
            "time_seen": "2024-01-01T12:00:00+00:00",
            "value": 1,
            "observations": { "source": "scan" },
        }])
    );
    Ok(())
}

/// A second process can recompute the same reading from the persisted output.
#[tokio::test]
async fn artifact_reparse_matches_stored_reading() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let tool = FakeTool::printing(dir.path(), HOME_LAN);
    let cfg = sensor_config(dir.path(), &tool);
    let store = Arc::new(LatestReadingStore::new());

    scheduler_for(&cfg, store.clone()).run_cycle().await;

    let artifact = ScanArtifact::new(cfg.artifact_path());
    let reparsed = parser::parse_artifact(&artifact, cfg.timezone).await?;
    assert_eq!(reparsed.into_reading(), *store.read());
    Ok(())
}

#[tokio::test]
async fn empty_tool_output_keeps_previous_reading() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let tool = FakeTool::new(
        dir.path(),
        &format!(
            "if [ -f '{flag}' ]; then exit 0; fi\ntouch '{flag}'\ncat <<'OUT'\n{HOME_LAN}OUT",
            flag = dir.path().join("ran-once").display()
        ),
    );
    let cfg = sensor_config(dir.path(), &tool);
    let store = Arc::new(LatestReadingStore::new());
    let scheduler = scheduler_for(&cfg, store.clone());

    assert!(matches!(scheduler.run_cycle().await, CycleOutcome::Stored { hosts: 1 }));
    assert!(matches!(scheduler.run_cycle().await, CycleOutcome::NoOutput));

    assert_eq!(store.read().len(), 1);
    assert_eq!(store.observations()[0].observable_id, "192.168.1.5");
    Ok(())
}

/// A hung scan is killed, the cycle is skipped, and the following cycle works again.
#[tokio::test]
async fn timed_out_cycle_does_not_affect_next_cycle() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let tool = FakeTool::new(
        dir.path(),
        &format!(
            "if [ ! -f '{flag}' ]; then touch '{flag}'; sleep 30; fi\ncat <<'OUT'\n{HOME_LAN}OUT",
            flag = dir.path().join("hung-once").display()
        ),
    );
    let cfg = sensor_config(dir.path(), &tool).with_scan_timeout(1)?;
    let store = Arc::new(LatestReadingStore::new());
    let scheduler = scheduler_for(&cfg, store.clone());

    let started = std::time::Instant::now();
    let outcome = scheduler.run_cycle().await;
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(matches!(
        outcome,
        CycleOutcome::Failed(ScanError::ToolTimeout { .. })
    ));
    assert!(store.read().is_empty());
    assert!(store.read().observed_at.is_none());

    assert!(matches!(scheduler.run_cycle().await, CycleOutcome::Stored { hosts: 1 }));
    Ok(())
}

#[tokio::test]
async fn failing_tool_is_contained_in_its_cycle() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let tool = FakeTool::new(dir.path(), "echo 'dnet: Failed to open device' >&2\nexit 1");
    let cfg = sensor_config(dir.path(), &tool);
    let store = Arc::new(LatestReadingStore::new());

    let outcome = scheduler_for(&cfg, store.clone()).run_cycle().await;

    match outcome {
        CycleOutcome::Failed(err @ ScanError::ToolInvocation { .. }) => {
            assert!(err.is_per_cycle());
            let chain = format!("{:#}", anyhow::Error::from(err));
            assert!(chain.contains("dnet: Failed to open device"), "{chain}");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(store.read().is_empty());
    Ok(())
}
