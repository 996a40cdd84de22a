//! Monitoreo REST API
//!
//! HTTP API layer, built with Axum.
//!
//! # Endpoints
//!
//! ## Readings
//! - `GET /api/datos` - Latest reading (404 `{"status":"sin_datos"}` when empty)
//! - `POST /api/datos` - Append a reading (optional `X-API-KEY`)
//!
//! ## History
//! - `GET /api/historial?n=` - Last n records in log order
//! - `GET /api/historial_resumen` - Distinct months/days present
//! - `GET /api/historial_filtro?zona=&mes=&dia=&hora=&n=` - Filtered, newest first
//! - `GET /api/historial_export?zona=&mes=` - CSV download
//!
//! ## Aggregation
//! - `GET /api/historicos?zona=` - 5-day x 2-hour bucket table
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use monitoreo::api::{build_router, serve, ApiConfig, AppState};
//! use monitoreo::store::FileStore;
//! use monitoreo::time::Normalizer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(FileStore::open("./data")?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, Normalizer::default(), config.clone(), 50_000);
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/datos",
            get(routes::readings::get_latest).post(routes::readings::ingest),
        )
        .route("/historial", get(routes::history::tail))
        .route("/historial_resumen", get(routes::history::summary))
        .route("/historial_filtro", get(routes::history::filtered))
        .route("/historial_export", get(routes::export::export))
        .route("/historicos", get(routes::buckets::table));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // Configure properly in production
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Monitoreo API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Monitoreo API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileStore;
    use crate::time::Normalizer;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    fn create_test_app(api_key: Option<&str>) -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        let api_config = ApiConfig {
            api_key: api_key.map(|k| k.to_string()),
            ..Default::default()
        };

        let state = AppState::new(store, Normalizer::default(), api_config, 10_000);
        let router = build_router(state);

        (router, dir)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_reading(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/datos")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_latest_empty_is_sin_datos() {
        let (app, _dir) = create_test_app(None);

        let response = app.oneshot(get("/api/datos")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["status"], "sin_datos");
    }

    #[tokio::test]
    async fn test_ingest_then_latest() {
        let (app, _dir) = create_test_app(None);

        let response = app
            .clone()
            .oneshot(post_reading(r#"{"temperatura": 21.5, "humedad": 60}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");

        let response = app.oneshot(get("/api/datos")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["zona"], "Z1");
        assert_eq!(body["temperatura"], 21.5);
        // Server-assigned fields are always present
        assert!(body["timestamp"].is_string());
        assert!(body["ts_server"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_ingest_api_key_mismatch_forbidden() {
        let (app, _dir) = create_test_app(Some("secreto"));

        let response = app
            .clone()
            .oneshot(post_reading(r#"{"temperatura": 20}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["status"], "forbidden");

        let request = Request::builder()
            .method("POST")
            .uri("/api/datos")
            .header("Content-Type", "application/json")
            .header("X-API-KEY", "secreto")
            .body(Body::from(r#"{"temperatura": 20, "humedad": 50}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_tail_returns_log_order() {
        let (app, _dir) = create_test_app(None);

        for temp in [20.0, 21.0, 22.0] {
            let body = format!(r#"{{"temperatura": {}, "humedad": 60}}"#, temp);
            app.clone().oneshot(post_reading(&body)).await.unwrap();
        }

        let response = app.oneshot(get("/api/historial?n=2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        // Newest appended last
        assert_eq!(rows[0]["temperatura"], 21.0);
        assert_eq!(rows[1]["temperatura"], 22.0);
    }

    #[tokio::test]
    async fn test_filtered_history_by_hour() {
        let (app, _dir) = create_test_app(None);

        for ts in ["2024-01-01 05:10:00", "2024-01-01 07:00:00", "2024-01-02 05:30:00"] {
            let body = format!(
                r#"{{"temperatura": 20, "humedad": 60, "timestamp": "{}"}}"#,
                ts
            );
            app.clone().oneshot(post_reading(&body)).await.unwrap();
        }

        let response = app
            .oneshot(get("/api/historial_filtro?zona=Z1&hora=05&mes="))
            .await
            .unwrap();
        let body = body_json(response).await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        // Descending by local instant
        assert_eq!(rows[0]["timestamp"], "2024-01-02 05:30:00");
        assert_eq!(rows[1]["timestamp"], "2024-01-01 05:10:00");
    }

    #[tokio::test]
    async fn test_summary_shape() {
        let (app, _dir) = create_test_app(None);

        let body = r#"{"temperatura": 20, "humedad": 60, "timestamp": "2024-01-01 05:00:00"}"#;
        app.clone().oneshot(post_reading(body)).await.unwrap();

        let response = app.oneshot(get("/api/historial_resumen")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["meses"], serde_json::json!(["2024-01"]));
        assert_eq!(body["dias_por_mes"]["2024-01"], serde_json::json!(["2024-01-01"]));
    }

    #[tokio::test]
    async fn test_export_csv_download() {
        let (app, _dir) = create_test_app(None);

        let body = r#"{"temperatura": 21.5, "humedad": 60, "timestamp": "2024-01-01 05:00:00"}"#;
        app.clone().oneshot(post_reading(body)).await.unwrap();

        let response = app
            .oneshot(get("/api/historial_export?zona=Z1&mes=2024-01"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/csv");
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=\"historial_Z1_2024-01.csv\""
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(
            csv,
            "fecha,hora,temperatura,humedad,zona\n2024-01-01,05:00,21.5,60,Z1\n"
        );
    }

    #[tokio::test]
    async fn test_bucket_table_window() {
        let (app, _dir) = create_test_app(None);

        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let body = format!(
            r#"{{"temperatura": 21.5, "humedad": 60, "timestamp": "{}"}}"#,
            now
        );
        app.clone().oneshot(post_reading(&body)).await.unwrap();

        let response = app.oneshot(get("/api/historicos?zona=Z1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let table = body_json(response).await;
        assert_eq!(table["zona"], "Z1");
        assert_eq!(table["dias"].as_array().unwrap().len(), 5);
        assert_eq!(table["horas"].as_array().unwrap().len(), 12);
        assert_eq!(table["horas"][11], "24:00");
        // Today's reading landed somewhere in the grid
        assert!(!table["celdas"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (app, _dir) = create_test_app(None);

        for uri in ["/health/live", "/health/ready", "/health"] {
            let response = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "uri {}", uri);
        }
    }
}
