//! Reading log storage
//!
//! This module provides the durable append-only log of sensor readings:
//!
//! - **types**: The [`Reading`] record
//! - **log**: The [`RecordStore`] capability and the flat-file [`FileStore`]
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   Reading → serialize → history line (append) + snapshot file (overwrite)
//!
//! Read Path:
//!   tail / bounded scan over raw lines → parse each → skip bad lines
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use monitoreo::store::{FileStore, Reading, RecordStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileStore::open("./data")?;
//!
//!     store.append(&Reading::new("Z1", 21.5, 60.0).timestamp("2024-01-01 05:00:00"))?;
//!
//!     let latest = store.snapshot();
//!     let recent = store.read_tail(200);
//!
//!     println!("latest = {:?}, {} recent records", latest, recent.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod log;
pub mod types;

// Re-export commonly used types
pub use error::{StoreError, StoreResult};
pub use log::{FileStore, RecordStore};
pub use types::{Reading, DEFAULT_ZONE};
