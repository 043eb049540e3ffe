//! # sheetseek-server
//!
//! Relay server: holds the Sheets API key and answers sheet requests for
//! clients that must not see it.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sheetseek_core::SeekError;
use sheetseek_http::relay::{
    ErrorResponse, RelayAction, RelayRequest, SheetDataResponse, SheetsResponse,
};
use sheetseek_http::{GoogleSheetsClient, GridFetcher, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};
use sheetseek_sheet::normalize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct Health {
    /// Server status ("ok" when healthy).
    pub status: String,
    /// Server version from Cargo.toml.
    pub version: String,
}

/// Shared handler state. `fetcher` is `None` when no API key is configured.
#[derive(Clone, Default)]
pub struct AppState {
    pub fetcher: Option<Arc<dyn GridFetcher>>,
}

/// Health check endpoint handler.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn seek_error_response(err: &SeekError) -> Response {
    let status = match err {
        SeekError::Auth(_) => StatusCode::FORBIDDEN,
        SeekError::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

/// Relay endpoint handler.
pub async fn relay(State(state): State<AppState>, body: Bytes) -> Response {
    let Some(fetcher) = state.fetcher else {
        tracing::error!("missing Google API key");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Google API key is not configured",
        );
    };

    let request: RelayRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("invalid relay request: {e}");
            return error_response(StatusCode::BAD_REQUEST, "Invalid action");
        }
    };
    tracing::info!(
        action = ?request.action,
        sheet_id = %request.sheet_id,
        sheet = request.sheet_name.as_deref().unwrap_or(""),
        "processing relay request"
    );

    match request.action {
        RelayAction::GetAvailableSheets => {
            match fetcher.fetch_available_sheets(&request.sheet_id).await {
                Ok(sheets) => Json(SheetsResponse { sheets }).into_response(),
                Err(e) => {
                    tracing::error!("error fetching sheets: {e}");
                    seek_error_response(&e)
                }
            }
        }
        RelayAction::GetSheetData => {
            let Some(sheet_name) = request.sheet_name.filter(|s| !s.is_empty()) else {
                return error_response(StatusCode::BAD_REQUEST, "sheetName is required");
            };
            match fetcher
                .fetch_range(&request.sheet_id, &sheet_name, request.range.as_deref())
                .await
            {
                Ok(grid) => {
                    let table = normalize(&sheet_name, &grid);
                    tracing::info!(
                        rows = table.record_count(),
                        columns = table.headers.len(),
                        "processed sheet"
                    );
                    Json(SheetDataResponse {
                        sheet_name: table.sheet_name,
                        headers: table.headers,
                        rows: table.records,
                    })
                    .into_response()
                }
                Err(e) => {
                    tracing::error!("error fetching sheet data: {e}");
                    seek_error_response(&e)
                }
            }
        }
    }
}

/// Create the application router.
///
/// This is separated from `main()` to allow testing.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(relay))
        .route("/health", get(health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn state_from_env() -> Result<AppState, Box<dyn std::error::Error>> {
    let Some(key) = std::env::var("GOOGLE_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
    else {
        tracing::warn!("GOOGLE_API_KEY is not set; relay requests will fail");
        return Ok(AppState::default());
    };
    let base = std::env::var("SHEETS_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
    let client = GoogleSheetsClient::with_base_url(base, key, DEFAULT_TIMEOUT_SECS)?;
    Ok(AppState {
        fetcher: Some(Arc::new(client)),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app = create_router(state_from_env()?);

    let addr = std::env::var("SHEETSEEK_RELAY_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    tracing::info!("sheetseek-server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use serde_json::{json, Value};
    use sheetseek_http::InMemoryFetcher;
    use tower::ServiceExt;

    fn app() -> Router {
        let fetcher = InMemoryFetcher::new("abc").with_sheet(
            "Customers",
            vec![
                vec!["ID".to_string(), "Name".to_string()],
                vec!["1".to_string(), "Alice".to_string()],
                vec!["2".to_string()],
            ],
        );
        create_router(AppState {
            fetcher: Some(Arc::new(fetcher)),
        })
    }

    async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint_status() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_handler_directly() {
        let Json(health) = health().await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_relay_available_sheets() {
        let (status, body) =
            post_json(app(), json!({"action": "getAvailableSheets", "sheetId": "abc"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"sheets": [{"id": "0", "name": "Customers"}]}));
    }

    #[tokio::test]
    async fn test_relay_sheet_data() {
        let (status, body) = post_json(
            app(),
            json!({"action": "getSheetData", "sheetId": "abc", "sheetName": "Customers"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sheetName"], "Customers");
        assert_eq!(body["headers"], json!(["ID", "Name"]));
        assert_eq!(
            body["rows"],
            json!([{"ID": "1", "Name": "Alice"}, {"ID": "2", "Name": ""}])
        );
    }

    #[tokio::test]
    async fn test_relay_missing_sheet() {
        let (status, body) = post_json(
            app(),
            json!({"action": "getSheetData", "sheetId": "abc", "sheetName": "Gone"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Sheet not found: Gone");
    }

    #[tokio::test]
    async fn test_relay_requires_sheet_name() {
        let (status, body) =
            post_json(app(), json!({"action": "getSheetData", "sheetId": "abc"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "sheetName is required");
    }

    #[tokio::test]
    async fn test_relay_invalid_action() {
        let (status, body) =
            post_json(app(), json!({"action": "dropTable", "sheetId": "abc"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid action");
    }

    #[tokio::test]
    async fn test_relay_without_key() {
        let app = create_router(AppState::default());
        let (status, body) =
            post_json(app, json!({"action": "getAvailableSheets", "sheetId": "abc"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Google API key is not configured");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/")
                    .header("origin", "http://localhost:8080")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
