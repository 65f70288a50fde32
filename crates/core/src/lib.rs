//! `payrep-core` — Payables ledger model and report configuration.
//!
//! Pure data crate: records, partitions, config. No file or network IO.

pub mod config;
pub mod error;
pub mod model;

pub use config::ReportConfig;
pub use error::ConfigError;
pub use model::{Partitions, PayableRecord, Status};
