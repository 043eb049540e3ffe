use sheetseek_config::SourceConfig;
use sheetseek_core::SeekResult;
use sheetseek_http::{GoogleSheetsClient, GridFetcher, RelayClient, DEFAULT_TIMEOUT_SECS};
use sheetseek_sheet::FieldDetector;
use std::sync::Arc;

/// Build the fetcher a configuration asks for: the relay when one is set,
/// otherwise the Sheets API with the resolved credential.
pub fn fetcher_for(config: &SourceConfig) -> SeekResult<Arc<dyn GridFetcher>> {
    config.ensure_complete()?;

    if let Some(url) = config.relay_url.as_deref().filter(|u| !u.trim().is_empty()) {
        tracing::debug!(relay = url, "using relay transport");
        return Ok(Arc::new(RelayClient::new(url)?));
    }

    let key = config.resolve_credential()?;
    let client = match config.api_base.as_deref() {
        Some(base) => GoogleSheetsClient::with_base_url(base, key, DEFAULT_TIMEOUT_SECS)?,
        None => GoogleSheetsClient::new(key)?,
    };
    Ok(Arc::new(client))
}

/// Field detector honoring indicator overrides from the configuration.
pub fn detector_for(config: &SourceConfig) -> FieldDetector {
    if config.name_indicators.is_none() && config.dob_indicators.is_none() {
        return FieldDetector::default();
    }
    let defaults = FieldDetector::default();
    let names = config
        .name_indicators
        .clone()
        .unwrap_or_else(|| defaults.name_indicators().to_vec());
    let dobs = config
        .dob_indicators
        .clone()
        .unwrap_or_else(|| defaults.dob_indicators().to_vec());
    FieldDetector::new(&names, &dobs)
}
