//! # Scan Scheduler
//!
//! Drives scan → parse → store on a fixed period grid anchored at loop start.
//!
//! Each cycle sleeps `interval - (elapsed % interval)`, so a slow scan eats
//! into its own sleep instead of pushing every later cycle back. A scan that
//! overruns the interval lands the next start on the following grid point.
//! Cycles never overlap: the next scan cannot start before the previous
//! cycle's sleep has finished.

use std::sync::Arc;
use std::time::Duration;

use lanpulse_common::config::ScanConfiguration;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::error::ScanError;
use crate::parser::{self, ParseWarning};
use crate::scanner::{ScanRunner, ToolScanner};
use crate::store::ReadingStore;

/// What a single cycle did with the store.
#[derive(Debug)]
pub enum CycleOutcome {
    /// A fresh reading replaced the previous one.
    Stored { hosts: usize },
    /// The tool printed nothing; the previous reading was kept.
    NoOutput,
    /// The scan failed; the previous reading was kept.
    Failed(ScanError),
}

pub struct Scheduler {
    config: ScanConfiguration,
    runner: Box<dyn ScanRunner>,
    store: Arc<dyn ReadingStore>,
}

impl Scheduler {
    pub fn new(
        config: ScanConfiguration,
        runner: Box<dyn ScanRunner>,
        store: Arc<dyn ReadingStore>,
    ) -> Self {
        Self {
            config,
            runner,
            store,
        }
    }

    /// Runs one scan cycle without sleeping afterwards.
    ///
    /// Failures are logged and contained here; they never reach the caller
    /// as errors, and they leave the store untouched.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let range = self.config.target.to_string();
        info!(range = %range, "Scanning for live hosts");

        let raw = match self.runner.run_scan(&range).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = &e as &dyn std::error::Error, "Scan failed, skipping this cycle");
                return CycleOutcome::Failed(e);
            }
        };

        let parsed = parser::parse(&raw, self.config.timezone);
        for warning in &parsed.warnings {
            warn!("{warning}");
        }

        if parsed.has_warning(ParseWarning::NoOutput) {
            return CycleOutcome::NoOutput;
        }

        let hosts = parsed.records.len();
        info!(
            hosts,
            range = %range,
            "At {}, found {hosts} connected hosts",
            parsed.observed_at
        );
        self.store.write(parsed.into_reading());

        CycleOutcome::Stored { hosts }
    }

    /// Runs cycles back to back on the configured period. Never returns.
    pub async fn run_forever(&self) {
        let interval = self.config.interval;
        let anchor = Instant::now();

        loop {
            self.run_cycle().await;

            let elapsed = anchor.elapsed();
            let pause = sleep_duration(elapsed, interval);
            info!(
                ?elapsed,
                ?pause,
                "Sleeping until {}s have passed since the last scan started",
                interval.as_secs()
            );
            tokio::time::sleep(pause).await;
        }
    }
}

/// Runs the tool-backed pipeline for `config` forever, writing into `sink`.
pub async fn run_forever(config: ScanConfiguration, sink: Arc<dyn ReadingStore>) {
    let runner = Box::new(ToolScanner::from_config(&config));
    Scheduler::new(config, runner, sink).run_forever().await;
}

/// Time left until the next grid point, in `(0, interval]`.
///
/// `elapsed` is measured from the grid anchor. Landing exactly on a grid point
/// waits a full interval rather than zero.
pub fn sleep_duration(elapsed: Duration, interval: Duration) -> Duration {
    if interval.is_zero() {
        return Duration::ZERO;
    }

    let interval_ns = interval.as_nanos();
    let remaining = interval_ns - elapsed.as_nanos() % interval_ns;

    u64::try_from(remaining)
        .map(Duration::from_nanos)
        .unwrap_or(interval)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
