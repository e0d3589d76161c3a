use std::sync::Arc;

use lanpulse_common::config::ScanConfiguration;
use lanpulse_core::scanner;
use lanpulse_core::scheduler;
use lanpulse_core::store::{LatestReadingStore, ReadingStore};
use tracing::{debug, info};

pub async fn run(cfg: ScanConfiguration) -> anyhow::Result<()> {
    scanner::check_preconditions(&cfg.tool)?;

    info!(
        "Sensing {} ({} addresses) every {}s",
        cfg.target,
        cfg.target.len(),
        cfg.interval.as_secs()
    );

    let store = Arc::new(LatestReadingStore::new());
    let reporter = tokio::spawn(report_readings(store.clone()));
    let sink: Arc<dyn ReadingStore> = store;

    tokio::select! {
        _ = scheduler::run_forever(cfg, sink) => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Interrupted, stopping");
        }
    }

    reporter.abort();
    Ok(())
}

/// Logs every replacement of the latest reading.
async fn report_readings(store: Arc<LatestReadingStore>) {
    let mut rx = store.subscribe();
    while rx.changed().await.is_ok() {
        let observations = rx.borrow_and_update().observations();
        match serde_json::to_string(&observations) {
            Ok(json) => debug!(reading = %json, "Latest reading replaced"),
            Err(e) => debug!("Could not render latest reading: {e}"),
        }
    }
}
