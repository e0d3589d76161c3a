//! Shared model for the `lanpulse` presence sensor.
//!
//! * [`config`]: the immutable per-run scan settings.
//! * [`network`]: the scan target model handed to the external scan tool.
//! * [`reading`]: presence records, the latest reading and the observation
//!   schema read by the aggregation pipeline.

pub mod config;
pub mod network;
pub mod reading;
