//! # Fit Export Library
//!
//! Exports the body-weight data sources of a Google Fit account and their
//! datasets to local JSON files.
//!
//! Modules:
//! - `config` — config file, startup configuration, time window
//! - `credentials` — credential cache, refresh and interactive authorization
//! - `api` — identity provider and fitness API adapters
//! - `export` — listing and per-source dataset export
//! - `sinks` — deterministic JSON file output

pub mod api;
pub mod config;
pub mod credentials;
pub mod export;
pub mod helpers;
pub mod sinks;
pub mod utils;

#[cfg(test)]
mod tests;


pub use crate::config::settings::ServiceConfig;
pub use crate::config::export::{ExportConfig, TimeWindow};
