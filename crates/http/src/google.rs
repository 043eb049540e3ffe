//! Google Sheets v4 API client.

use crate::{build_client, status_error, GridFetcher, DEFAULT_TIMEOUT_SECS};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sheetseek_core::{Grid, SeekError, SeekResult, SheetInfo};

/// Public endpoint of the Sheets API.
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

/// Body marker the API uses when a range names a sheet that does not exist.
const MISSING_RANGE_MARKER: &str = "Unable to parse range";

/// Fetches sheets directly from the Google Sheets API with an API key.
pub struct GoogleSheetsClient {
    client: Client,
    api_base: String,
    api_key: String,
}

#[derive(Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<JsonValue>>,
}

impl GoogleSheetsClient {
    /// Constructs a client for the public API with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `SeekError::Network` if building the underlying HTTP client fails.
    pub fn new(api_key: impl Into<String>) -> SeekResult<Self> {
        Self::with_base_url(DEFAULT_API_BASE, api_key, DEFAULT_TIMEOUT_SECS)
    }

    /// Constructs a client against another API base (a proxy or a test server).
    pub fn with_base_url(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> SeekResult<Self> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// URL for `v4/spreadsheets/{id}` followed by extra path segments.
    fn endpoint(&self, source_id: &str, extra: &[&str]) -> SeekResult<Url> {
        let base = &self.api_base;
        let mut url = Url::parse(base)
            .map_err(|e| SeekError::Config(format!("invalid API base '{base}': {e}")))?;
        url.path_segments_mut()
            .map_err(|()| SeekError::Config(format!("API base '{base}' cannot hold a path")))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", source_id])
            .extend(extra);
        Ok(url)
    }

    /// Send a GET, logging the URL before the key is attached.
    async fn get(&self, mut url: Url, sheet: Option<&str>) -> SeekResult<reqwest::Response> {
        tracing::debug!(url = %url, "fetching from Sheets API");
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SeekError::network(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "Sheets API error: {body}");
        if let Some(name) = sheet {
            if status == StatusCode::BAD_REQUEST && body.contains(MISSING_RANGE_MARKER) {
                return Err(SeekError::not_found(name));
            }
        }
        Err(status_error(status, &body, sheet))
    }
}

#[async_trait]
impl GridFetcher for GoogleSheetsClient {
    async fn fetch_available_sheets(&self, source_id: &str) -> SeekResult<Vec<SheetInfo>> {
        let url = self.endpoint(source_id, &[])?;
        let metadata: SpreadsheetMetadata = self
            .get(url, None)
            .await?
            .json()
            .await
            .map_err(|e| SeekError::network(format!("Failed to parse JSON: {e}")))?;

        let sheets: Vec<SheetInfo> = metadata
            .sheets
            .into_iter()
            .map(|s| SheetInfo {
                id: s.properties.sheet_id.to_string(),
                name: s.properties.title,
            })
            .collect();
        tracing::info!(count = sheets.len(), "found sheets");
        Ok(sheets)
    }

    async fn fetch_range(
        &self,
        source_id: &str,
        sheet_name: &str,
        range: Option<&str>,
    ) -> SeekResult<Grid> {
        let api_range = a1_range(sheet_name, range);
        let url = self.endpoint(source_id, &["values", &api_range])?;
        let body: ValueRange = self
            .get(url, Some(sheet_name))
            .await?
            .json()
            .await
            .map_err(|e| SeekError::network(format!("Failed to parse JSON: {e}")))?;

        let grid: Grid = body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        if grid.is_empty() {
            tracing::info!(sheet = sheet_name, "no data found in sheet");
        }
        Ok(grid)
    }
}

/// A1 notation for a sheet, optionally narrowed to a cell range.
///
/// The name is always quoted so titles that look like cell references
/// (`AB12`) or contain `!` resolve to the sheet; `'` is doubled.
fn a1_range(sheet_name: &str, range: Option<&str>) -> String {
    let quoted = format!("'{}'", sheet_name.replace('\'', "''"));
    match range {
        Some(r) if !r.is_empty() => format!("{quoted}!{r}"),
        _ => quoted,
    }
}

/// Render a cell as text. The API sends formatted strings by default but
/// unformatted numbers and booleans can appear.
fn cell_text(cell: JsonValue) -> String {
    match cell {
        JsonValue::String(s) => s,
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
