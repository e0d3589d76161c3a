//! The scan → parse → store pipeline of the presence sensor, and the
//! fixed-cadence scheduler that drives it.

pub mod artifact;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod scheduler;
pub mod store;

pub use error::ScanError;
