pub mod read;
pub mod run;
pub mod scan;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lanpulse_common::config::{
    ConfigError, DEFAULT_INTERVAL_SECONDS, DEFAULT_SCAN_TIMEOUT_SECONDS, DEFAULT_SCAN_TOOL,
    DEFAULT_SUBNET_RANGE, DEFAULT_TIMEZONE, ScanConfiguration,
};
use lanpulse_common::reading::LatestReading;

#[derive(Parser)]
#[command(name = "lanpulse")]
#[command(about = "Senses which hosts are up in a local network, on a fixed interval.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub settings: Settings,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the subnet on a fixed interval until interrupted
    #[command(alias = "r")]
    Run,
    /// Run a single scan cycle and print the reading
    #[command(alias = "s")]
    Scan,
    /// Re-parse the last raw scan output and print the reading
    Read,
}

/// Startup configuration. Every option can also be set through the environment.
#[derive(Args, Debug)]
pub struct Settings {
    /// Address range to scan (CIDR, `a.b.c.x-y` range or single address)
    #[arg(long, env = "AILEEN_LAN_SUBNET_MASK", default_value = DEFAULT_SUBNET_RANGE)]
    pub subnet_range: String,

    /// Seconds between the starts of two scans
    #[arg(long = "interval", env = "AILEEN_LAN_INTERVAL_IN_SECONDS", default_value_t = DEFAULT_INTERVAL_SECONDS)]
    pub interval_seconds: u64,

    /// IANA timezone used for scan timestamps
    #[arg(long, env = "AILEEN_LAN_TIMEZONE", default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    /// Scan tool binary, invoked as `<tool> -sn <range>`
    #[arg(long, env = "AILEEN_LAN_SCAN_TOOL", default_value = DEFAULT_SCAN_TOOL)]
    pub tool: String,

    /// Seconds after which a running scan is killed
    #[arg(long = "scan-timeout", env = "AILEEN_LAN_SCAN_TIMEOUT_IN_SECONDS", default_value_t = DEFAULT_SCAN_TIMEOUT_SECONDS)]
    pub scan_timeout_seconds: u64,

    /// Directory for the raw scan output [default: the system temp dir]
    #[arg(long, env = "AILEEN_LAN_TMP_PATH")]
    pub tmp_path: Option<PathBuf>,
}

impl Settings {
    pub fn to_config(&self) -> Result<ScanConfiguration, ConfigError> {
        let mut cfg = ScanConfiguration::new(&self.subnet_range, self.interval_seconds, &self.timezone)?
            .with_tool(self.tool.clone())?
            .with_scan_timeout(self.scan_timeout_seconds)?;

        if let Some(tmp_path) = &self.tmp_path {
            cfg = cfg.with_tmp_dir(tmp_path);
        }

        Ok(cfg)
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Writes the reading to stdout in the collector's observation schema.
pub fn print_reading(reading: &LatestReading) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&reading.observations())?;
    println!("{json}");
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
