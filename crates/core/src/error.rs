//! Error types for sheetseek.

use thiserror::Error;

/// Result type for sheetseek operations.
pub type SeekResult<T> = Result<T, SeekError>;

/// Errors raised by the collaborators around the matching engine.
///
/// The normalizer, detector and matcher never fail; everything here comes
/// from fetching grids, reading configuration, or driving a session.
#[derive(Debug, Error)]
pub enum SeekError {
    /// Source identifier or credential is absent or blank.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Transport failure or unexpected upstream response.
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream rejected the credential.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The requested sheet no longer exists.
    #[error("Sheet not found: {sheet}")]
    NotFound { sheet: String },

    /// A search was attempted before any sheet was loaded.
    #[error("No sheet selected")]
    NoSheetSelected,

    /// The loaded sheet has no headers, so there is nothing to search by.
    #[error("Search disabled: sheet '{sheet}' has no headers")]
    SearchDisabled { sheet: String },

    /// Configuration could not be read or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SeekError {
    /// Create a missing-configuration error naming the absent field.
    pub fn config_missing(field: impl Into<String>) -> Self {
        Self::ConfigurationMissing(field.into())
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a not-found error for a sheet.
    pub fn not_found(sheet: impl Into<String>) -> Self {
        Self::NotFound {
            sheet: sheet.into(),
        }
    }

    /// Whether the user may retry by refreshing explicitly.
    ///
    /// Nothing is retried automatically; this only decides whether the UI
    /// offers a refresh.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Auth(_))
    }

    /// The sentence shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigurationMissing(_) => {
                "Please configure the connection (source identifier and credential).".to_string()
            }
            Self::Network(msg) => format!("Could not reach the data source: {msg}"),
            Self::Auth(_) => {
                "The data source rejected the credential. Check the configured key.".to_string()
            }
            Self::NotFound { sheet } => format!("Sheet '{sheet}' is unavailable."),
            Self::NoSheetSelected => "Please select a sheet first.".to_string(),
            Self::SearchDisabled { sheet } => {
                format!("Sheet '{sheet}' has no headers; search is disabled.")
            }
            Self::Config(msg) => format!("Could not access the configuration: {msg}"),
            Self::Io(e) => format!("I/O failure: {e}"),
            Self::Json(e) => format!("Unexpected data format: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(matches!(
            SeekError::config_missing("sourceId"),
            SeekError::ConfigurationMissing(f) if f == "sourceId"
        ));
        assert!(matches!(
            SeekError::not_found("Data"),
            SeekError::NotFound { sheet } if sheet == "Data"
        ));
    }

    #[test]
    fn test_display() {
        let err = SeekError::network("HTTP 500: boom");
        assert_eq!(err.to_string(), "Network error: HTTP 500: boom");

        let err = SeekError::not_found("Customers");
        assert_eq!(err.to_string(), "Sheet not found: Customers");
    }

    #[test]
    fn test_user_message() {
        assert!(SeekError::config_missing("sourceId")
            .user_message()
            .contains("configure the connection"));
        assert_eq!(
            SeekError::not_found("Sales").user_message(),
            "Sheet 'Sales' is unavailable."
        );
        assert_eq!(
            SeekError::NoSheetSelected.user_message(),
            "Please select a sheet first."
        );
        assert_eq!(
            SeekError::SearchDisabled {
                sheet: "Blank".to_string()
            }
            .user_message(),
            "Sheet 'Blank' has no headers; search is disabled."
        );
    }

    #[test]
    fn test_retryable() {
        assert!(SeekError::network("timeout").is_retryable());
        assert!(SeekError::auth("403").is_retryable());
        assert!(!SeekError::config_missing("credentialRef").is_retryable());
        assert!(!SeekError::not_found("x").is_retryable());
        assert!(!SeekError::SearchDisabled {
            sheet: "x".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SeekError = io.into();
        assert!(matches!(err, SeekError::Io(_)));
    }
}
