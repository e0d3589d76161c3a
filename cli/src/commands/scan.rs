use std::sync::Arc;

use lanpulse_common::config::ScanConfiguration;
use lanpulse_core::scanner::{self, ToolScanner};
use lanpulse_core::scheduler::{CycleOutcome, Scheduler};
use lanpulse_core::store::{LatestReadingStore, ReadingStore};

use super::print_reading;

pub async fn scan(cfg: ScanConfiguration) -> anyhow::Result<()> {
    scanner::check_preconditions(&cfg.tool)?;

    let store = Arc::new(LatestReadingStore::new());
    let runner = Box::new(ToolScanner::from_config(&cfg));
    let scheduler = Scheduler::new(cfg, runner, store.clone());

    if let CycleOutcome::Failed(e) = scheduler.run_cycle().await {
        return Err(e.into());
    }

    print_reading(&store.read())
}
