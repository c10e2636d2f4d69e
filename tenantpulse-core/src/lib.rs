//! # tenantpulse-core
//!
//! Core library for tenantpulse - tenant analytics for a messaging platform.
//!
//! This library provides:
//! - Domain types for companies, users, instances, channels and broadcasts
//! - Snapshot ingestion and pre-analysis filtering
//! - The analytics engine (health, alerts, benchmarks, revenue, forecast)
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tenantpulse_core::analytics::AnalysisReport;
//! use tenantpulse_core::{ingest, Config, SnapshotFilter};
//!
//! let (config, _source) = Config::load().expect("failed to load config");
//! let snapshot = ingest::load_snapshot(Path::new("merged_data.json")).expect("failed to load");
//! let companies = SnapshotFilter::default().apply(&snapshot.companies).expect("filter");
//!
//! let mut rng = rand::thread_rng();
//! let today = chrono::Local::now().date_naive();
//! let report = AnalysisReport::build(&companies, &config, &mut rng, today);
//! println!("{} alerts", report.alerts.len());
//! ```

// Re-export commonly used items at the crate root
pub use config::{Config, ConfigSource};
pub use error::{Error, Result};
pub use filter::SnapshotFilter;
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod types;
