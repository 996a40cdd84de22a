//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON. Field names follow
//! the contract the dashboard frontend already speaks (`zona`, `mes`, `dia`,
//! `hora`, `meses`, `dias_por_mes`).

use serde::{Deserialize, Serialize};

// ============================================
// INGEST DTOs
// ============================================

/// Body of `POST /api/datos`: a reading object with every field optional.
/// The server fills missing `zona` and `timestamp` and always assigns
/// `ts_server`.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub zona: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub temperatura: Option<f64>,
    #[serde(default)]
    pub humedad: Option<f64>,
}

/// Plain status acknowledgement (`{"status": "ok"}`)
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

// ============================================
// QUERY PARAMS
// ============================================

/// `GET /api/historial` parameters
#[derive(Debug, Deserialize)]
pub struct TailParams {
    /// Number of most recent records to return
    #[serde(default)]
    pub n: Option<usize>,
}

/// `GET /api/historial_filtro` parameters
///
/// The frontend sends empty strings for "all"; they are treated as absent.
#[derive(Debug, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub zona: Option<String>,
    #[serde(default)]
    pub mes: Option<String>,
    #[serde(default)]
    pub dia: Option<String>,
    #[serde(default)]
    pub hora: Option<String>,
    #[serde(default)]
    pub n: Option<usize>,
}

/// `GET /api/historial_export` parameters
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub zona: Option<String>,
    #[serde(default)]
    pub mes: Option<String>,
}

/// `GET /api/historicos` parameters
#[derive(Debug, Deserialize)]
pub struct BucketParams {
    #[serde(default)]
    pub zona: Option<String>,
}

/// Drop empty-string query values so "all" filters read as absent
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy
    pub status: String,
    /// Whether any reading has been ingested yet
    pub has_data: bool,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("".to_string())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("2024-01".to_string())), Some("2024-01".to_string()));
    }

    #[test]
    fn test_ingest_request_all_optional() {
        let req: IngestRequest = serde_json::from_str("{}").unwrap();
        assert!(req.zona.is_none());
        assert!(req.temperatura.is_none());

        let req: IngestRequest =
            serde_json::from_str(r#"{"temperatura": 21.5, "humedad": 60, "zona": "Z2"}"#).unwrap();
        assert_eq!(req.temperatura, Some(21.5));
        assert_eq!(req.zona.as_deref(), Some("Z2"));
    }
}
