//! # Monitoreo
//!
//! Sensor telemetry service: ingests periodic temperature/humidity readings,
//! persists them to an append-only log, and serves derived views over HTTP.
//!
//! ## Features
//!
//! - **Append-only storage**: One JSON line per reading plus an O(1) latest
//!   snapshot; no index, reads are bounded linear scans
//! - **Timezone normalization**: Two accepted producer timestamp forms,
//!   canonicalized into a configured IANA zone
//! - **Bucketed aggregation**: Deterministic 5-day x 2-hour last-writer-wins
//!   grid over out-of-order, duplicate-timestamped logs
//! - **Tolerant reads**: Corrupt log lines are skipped, never fatal
//!
//! ## Modules
//!
//! - [`store`]: Reading record and the append-only log
//! - [`time`]: Timestamp normalization
//! - [`aggregate`]: The bucket table
//! - [`query`]: History filtering and the month/day summary index
//! - [`export`]: CSV export
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use monitoreo::aggregate::BucketAggregator;
//! use monitoreo::store::{FileStore, Reading, RecordStore};
//! use monitoreo::time::Normalizer;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileStore::open("./data")?;
//!     let normalizer = Normalizer::from_name(Some("America/Costa_Rica"));
//!
//!     // Ingest a reading
//!     store.append(&Reading::new("Z1", 21.5, 60.0).timestamp("2024-01-01 05:00:00"))?;
//!
//!     // Build the dashboard grid for the trailing 5 days
//!     let table = BucketAggregator::default().table(
//!         &store,
//!         &normalizer,
//!         "Z1",
//!         normalizer.today(),
//!     );
//!
//!     println!("{} days x {} buckets", table.dias.len(), table.horas.len());
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod api;
pub mod config;
pub mod export;
pub mod query;
pub mod store;
pub mod time;

// Re-export top-level types for convenience
pub use store::{FileStore, Reading, RecordStore, StoreError, StoreResult, DEFAULT_ZONE};

pub use aggregate::{bucket_label, BucketAggregator, BucketTable, Cell, DEFAULT_WINDOW_DAYS};

pub use query::{filter_history, summary_index, HistoryFilter, Summary};

pub use export::{export_csv, export_filename, ExportError};

pub use time::{Normalizer, TimeError};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig, StoreConfig, TimeConfig};
