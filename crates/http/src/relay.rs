//! Relay transport.
//!
//! A relay is a small backend that holds the Sheets API key and answers JSON
//! `POST` requests on behalf of clients that must not see the key. The
//! message types here are shared with the relay server.

use crate::{build_client, GridFetcher, DEFAULT_TIMEOUT_SECS};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use sheetseek_core::{Grid, Record, SeekError, SeekResult, SheetInfo};

/// Operation requested from the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelayAction {
    GetAvailableSheets,
    GetSheetData,
}

/// Body of a relay request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    pub action: RelayAction,
    pub sheet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
}

/// Response to `getAvailableSheets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetsResponse {
    pub sheets: Vec<SheetInfo>,
}

/// Response to `getSheetData`: the sheet already split into headers and
/// row objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetDataResponse {
    pub sheet_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Record>,
}

impl SheetDataResponse {
    /// Reassemble a grid: the header row, then each row's values in header
    /// order. Absent keys become empty cells.
    #[must_use]
    pub fn into_grid(self) -> Grid {
        if self.headers.is_empty() {
            return Grid::new();
        }
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        for row in &self.rows {
            grid.push(
                self.headers
                    .iter()
                    .map(|h| row.get(h).unwrap_or_default().to_string())
                    .collect(),
            );
        }
        grid.insert(0, self.headers);
        grid
    }
}

/// Error body returned by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Fetches sheets through a relay endpoint.
pub struct RelayClient {
    client: Client,
    endpoint: String,
}

impl RelayClient {
    /// Constructs a client posting to `endpoint` with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> SeekResult<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout_secs: u64) -> SeekResult<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            endpoint: endpoint.into(),
        })
    }

    async fn call(&self, request: &RelayRequest) -> SeekResult<reqwest::Response> {
        tracing::debug!(
            endpoint = %self.endpoint,
            action = ?request.action,
            sheet = request.sheet_name.as_deref().unwrap_or(""),
            "relay request"
        );
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| SeekError::network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.error)
            .unwrap_or(text);
        tracing::warn!(status = status.as_u16(), "relay error: {message}");

        Err(match (status, request.sheet_name.as_deref()) {
            (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => SeekError::auth(message),
            (StatusCode::NOT_FOUND, Some(sheet)) => SeekError::not_found(sheet),
            _ => SeekError::network(format!("HTTP {} - {message}", status.as_u16())),
        })
    }
}

#[async_trait]
impl GridFetcher for RelayClient {
    async fn fetch_available_sheets(&self, source_id: &str) -> SeekResult<Vec<SheetInfo>> {
        let request = RelayRequest {
            action: RelayAction::GetAvailableSheets,
            sheet_id: source_id.to_string(),
            sheet_name: None,
            range: None,
        };
        let body: SheetsResponse = self
            .call(&request)
            .await?
            .json()
            .await
            .map_err(|e| SeekError::network(format!("Failed to parse JSON: {e}")))?;
        Ok(body.sheets)
    }

    async fn fetch_range(
        &self,
        source_id: &str,
        sheet_name: &str,
        range: Option<&str>,
    ) -> SeekResult<Grid> {
        let request = RelayRequest {
            action: RelayAction::GetSheetData,
            sheet_id: source_id.to_string(),
            sheet_name: Some(sheet_name.to_string()),
            range: range.map(str::to_string),
        };
        let body: SheetDataResponse = self
            .call(&request)
            .await?
            .json()
            .await
            .map_err(|e| SeekError::network(format!("Failed to parse JSON: {e}")))?;
        Ok(body.into_grid())
    }
}
