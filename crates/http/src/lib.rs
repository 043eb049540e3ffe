//! # sheetseek-http
//!
//! Grid fetchers for remote spreadsheets.
//!
//! A [`GridFetcher`] lists the sheets of a source and returns the raw cell
//! grid of one sheet. Two transports are provided: [`GoogleSheetsClient`]
//! talks to the Google Sheets v4 API directly, [`RelayClient`] goes through a
//! relay that holds the API key. [`InMemoryFetcher`] serves fixed grids.
//! Supports HTTP/2 via ALPN negotiation with fallback to HTTP/1.1.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use sheetseek_core::{Grid, SeekError, SeekResult, SheetInfo};
use std::time::Duration;

mod google;
mod memory;
pub mod relay;

pub use google::{GoogleSheetsClient, DEFAULT_API_BASE};
pub use memory::InMemoryFetcher;
pub use relay::RelayClient;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Source of raw sheet grids.
///
/// Implementations perform I/O and may fail with `Network`, `Auth` or
/// `NotFound`. Callers own staleness: a slow fetch for a sheet that is no
/// longer selected is discarded by the session, not cancelled here.
#[async_trait]
pub trait GridFetcher: Send + Sync {
    /// List the sheets of a spreadsheet.
    async fn fetch_available_sheets(&self, source_id: &str) -> SeekResult<Vec<SheetInfo>>;

    /// Fetch a sheet, optionally restricted to an A1 range such as `A1:D20`.
    async fn fetch_range(
        &self,
        source_id: &str,
        sheet_name: &str,
        range: Option<&str>,
    ) -> SeekResult<Grid>;

    /// Fetch every populated cell of a sheet.
    async fn fetch_grid(&self, source_id: &str, sheet_name: &str) -> SeekResult<Grid> {
        self.fetch_range(source_id, sheet_name, None).await
    }
}

/// Build the shared reqwest client.
///
/// Proxy discovery is disabled to avoid macOS system-configuration issues.
pub(crate) fn build_client(timeout_secs: u64) -> SeekResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(format!("sheetseek/{}", env!("CARGO_PKG_VERSION")))
        .no_proxy()
        .build()
        .map_err(|e| SeekError::network(e.to_string()))
}

/// Map a non-success upstream status to the error taxonomy.
///
/// `sheet` is the sheet being fetched; without one a 404 is reported as a
/// network error since there is no sheet to call unavailable.
pub(crate) fn status_error(status: StatusCode, body: &str, sheet: Option<&str>) -> SeekError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SeekError::auth(format!("HTTP {} - {}", status.as_u16(), body))
        }
        StatusCode::NOT_FOUND => match sheet {
            Some(name) => SeekError::not_found(name),
            None => SeekError::network(format!("HTTP 404 - {body}")),
        },
        _ => SeekError::network(format!(
            "HTTP {} - {}",
            status.as_u16(),
            if body.is_empty() {
                status.canonical_reason().unwrap_or("Unknown")
            } else {
                body
            }
        )),
    }
}
