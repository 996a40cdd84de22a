//! Core record type for the reading log
//!
//! A [`Reading`] is one sensor report: temperature and humidity for a zone,
//! carrying the producer timestamp and the server-assigned timestamp. Wire
//! field names follow the JSON contract the dashboard frontend consumes
//! (`zona`, `temperatura`, `humedad`, `ts_server`).

use serde::{Deserialize, Serialize};

/// Default zone tag applied when a producer omits one
pub const DEFAULT_ZONE: &str = "Z1";

/// One sensor reading as stored in the append-only log
///
/// Measurements are optional: a record without them stays in the raw log but
/// never wins an aggregation cell. Timestamps are kept as the textual forms
/// the producer sent; normalization happens on the read path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    /// Sensor zone tag; any string is valid, absent means `"Z1"`
    #[serde(default = "default_zone")]
    pub zona: String,
    /// Producer-supplied time, `"YYYY-MM-DD HH:MM:SS"` or ISO-8601
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Server time assigned at append, UTC `...Z` form, non-decreasing per process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_server: Option<String>,
    /// Temperature in degrees Celsius
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperatura: Option<f64>,
    /// Relative humidity in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humedad: Option<f64>,
}

fn default_zone() -> String {
    DEFAULT_ZONE.to_string()
}

impl Reading {
    /// Create a reading with both measurements for a zone
    pub fn new(zona: impl Into<String>, temperatura: f64, humedad: f64) -> Self {
        Self {
            zona: zona.into(),
            timestamp: None,
            ts_server: None,
            temperatura: Some(temperatura),
            humedad: Some(humedad),
        }
    }

    /// Builder method: set the producer timestamp
    pub fn timestamp(mut self, ts: impl Into<String>) -> Self {
        self.timestamp = Some(ts.into());
        self
    }

    /// Builder method: set the server timestamp
    pub fn ts_server(mut self, ts: impl Into<String>) -> Self {
        self.ts_server = Some(ts.into());
        self
    }

    /// Whether both measurements are present (required to win a bucket cell)
    pub fn has_measurements(&self) -> bool {
        self.temperatura.is_some() && self.humedad.is_some()
    }
}

impl Default for Reading {
    fn default() -> Self {
        Self {
            zona: default_zone(),
            timestamp: None,
            ts_server: None,
            temperatura: None,
            humedad: None,
        }
    }
}
