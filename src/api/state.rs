//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::aggregate::BucketAggregator;
use crate::store::RecordStore;
use crate::time::Normalizer;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store backing every endpoint
    pub store: Arc<dyn RecordStore>,
    /// Timestamp normalizer carrying the configured local zone
    pub normalizer: Normalizer,
    /// Bucket-table aggregator (fixed window, bounded scan)
    pub aggregator: BucketAggregator,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Raw-line cap for read-side scans
    pub max_scan_lines: usize,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        store: Arc<dyn RecordStore>,
        normalizer: Normalizer,
        config: ApiConfig,
        max_scan_lines: usize,
    ) -> Self {
        Self {
            store,
            normalizer,
            aggregator: BucketAggregator::new(
                crate::aggregate::DEFAULT_WINDOW_DAYS,
                max_scan_lines,
            ),
            config: Arc::new(config),
            max_scan_lines,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Shared secret for ingestion; `None` accepts any producer
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            api_key: None,
            request_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
