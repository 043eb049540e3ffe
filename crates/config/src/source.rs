// Connection settings for a spreadsheet source
// Stored as camelCase JSON; older files written with googleApiKey / sheetId /
// selectedColumns keys are still read.

use serde::{Deserialize, Serialize};
use sheetseek_core::{SeekError, SeekResult};

/// Prefix marking a credential reference that names an environment variable.
pub const ENV_PREFIX: &str = "env:";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceConfig {
    /// API key, or `env:NAME` to read it from the environment
    #[serde(alias = "googleApiKey")]
    pub credential_ref: String,

    /// Spreadsheet identifier
    #[serde(alias = "sheetId")]
    pub source_id: String,

    /// Fields used by the last successful search
    #[serde(alias = "selectedColumns")]
    pub last_selected_fields: Vec<String>,

    /// Relay endpoint; when set, requests go through it instead of the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_url: Option<String>,

    /// Override of the Sheets API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Replacement name indicators for field detection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_indicators: Option<Vec<String>>,

    /// Replacement date-of-birth indicators for field detection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob_indicators: Option<Vec<String>>,
}

/// Partial update for [`SourceConfig`]. `None` leaves a field untouched; an
/// empty string clears an optional URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    pub credential_ref: Option<String>,
    pub source_id: Option<String>,
    pub last_selected_fields: Option<Vec<String>>,
    pub relay_url: Option<String>,
    pub api_base: Option<String>,
}

impl ConfigPatch {
    /// Patch that only records the fields of a search.
    pub fn selected_fields(fields: Vec<String>) -> Self {
        Self {
            last_selected_fields: Some(fields),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl SourceConfig {
    /// Merge a patch into this config.
    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(credential) = patch.credential_ref {
            self.credential_ref = credential.trim().to_string();
        }
        if let Some(source) = patch.source_id {
            self.source_id = source.trim().to_string();
        }
        if let Some(fields) = patch.last_selected_fields {
            self.last_selected_fields = fields;
        }
        if let Some(url) = patch.relay_url {
            self.relay_url = non_blank(url);
        }
        if let Some(url) = patch.api_base {
            self.api_base = non_blank(url);
        }
    }

    /// Whether requests go through a relay, which holds the key itself.
    pub fn uses_relay(&self) -> bool {
        self.relay_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    /// Check that the connection is configured.
    ///
    /// The source identifier is always required; a credential is required
    /// unless a relay is configured.
    pub fn ensure_complete(&self) -> SeekResult<()> {
        if self.source_id.trim().is_empty() {
            return Err(SeekError::config_missing("sourceId"));
        }
        if !self.uses_relay() && self.credential_ref.trim().is_empty() {
            return Err(SeekError::config_missing("credentialRef"));
        }
        Ok(())
    }

    /// Resolve the credential reference to the actual key.
    pub fn resolve_credential(&self) -> SeekResult<String> {
        let reference = self.credential_ref.trim();
        if reference.is_empty() {
            return Err(SeekError::config_missing("credentialRef"));
        }
        match reference.strip_prefix(ENV_PREFIX) {
            Some(var) => match std::env::var(var) {
                Ok(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(SeekError::config_missing(format!(
                    "credentialRef (environment variable {var} is not set)"
                ))),
            },
            None => Ok(reference.to_string()),
        }
    }

    /// Credential for display: env references as-is, literal keys masked.
    pub fn masked_credential(&self) -> String {
        let reference = self.credential_ref.trim();
        if reference.is_empty() || reference.starts_with(ENV_PREFIX) {
            return reference.to_string();
        }
        let tail: String = reference
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("****{tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> SourceConfig {
        SourceConfig {
            credential_ref: "AIzaSyExampleKey".to_string(),
            source_id: "1VvBc".to_string(),
            ..SourceConfig::default()
        }
    }

    #[test]
    fn test_default_is_incomplete() {
        let err = SourceConfig::default().ensure_complete().unwrap_err();
        assert!(matches!(err, SeekError::ConfigurationMissing(f) if f == "sourceId"));
    }

    #[test]
    fn test_blank_credential_is_incomplete() {
        let config = SourceConfig {
            credential_ref: "   ".to_string(),
            ..configured()
        };
        let err = config.ensure_complete().unwrap_err();
        assert!(matches!(err, SeekError::ConfigurationMissing(f) if f == "credentialRef"));
    }

    #[test]
    fn test_relay_needs_no_credential() {
        let config = SourceConfig {
            credential_ref: String::new(),
            relay_url: Some("http://localhost:3000/".to_string()),
            ..configured()
        };
        assert!(config.ensure_complete().is_ok());
    }

    #[test]
    fn test_apply_patch() {
        let mut config = configured();
        config.apply(ConfigPatch {
            source_id: Some("  other  ".to_string()),
            relay_url: Some("http://relay".to_string()),
            ..ConfigPatch::default()
        });
        assert_eq!(config.source_id, "other");
        assert_eq!(config.credential_ref, "AIzaSyExampleKey");
        assert!(config.uses_relay());

        config.apply(ConfigPatch {
            relay_url: Some(String::new()),
            ..ConfigPatch::default()
        });
        assert!(config.relay_url.is_none());

        config.apply(ConfigPatch::selected_fields(vec!["Name".to_string()]));
        assert_eq!(config.last_selected_fields, vec!["Name"]);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ConfigPatch::default().is_empty());
        assert!(!ConfigPatch::selected_fields(Vec::new()).is_empty());
    }

    #[test]
    fn test_resolve_literal_credential() {
        assert_eq!(configured().resolve_credential().unwrap(), "AIzaSyExampleKey");
    }

    #[test]
    fn test_resolve_env_credential() {
        let config = SourceConfig {
            credential_ref: "env:SHEETSEEK_TEST_UNSET_VARIABLE".to_string(),
            ..configured()
        };
        assert!(matches!(
            config.resolve_credential(),
            Err(SeekError::ConfigurationMissing(_))
        ));

        let config = SourceConfig {
            credential_ref: "env:PATH".to_string(),
            ..configured()
        };
        assert!(config.resolve_credential().is_ok());
    }

    #[test]
    fn test_masked_credential() {
        assert_eq!(configured().masked_credential(), "****eKey");
        let env = SourceConfig {
            credential_ref: "env:GOOGLE_API_KEY".to_string(),
            ..configured()
        };
        assert_eq!(env.masked_credential(), "env:GOOGLE_API_KEY");
    }

    #[test]
    fn test_reads_legacy_keys() {
        let config: SourceConfig = serde_json::from_str(
            r#"{"googleApiKey": "k", "sheetId": "s", "selectedColumns": ["Name", "Email"]}"#,
        )
        .unwrap();
        assert_eq!(config.credential_ref, "k");
        assert_eq!(config.source_id, "s");
        assert_eq!(config.last_selected_fields, vec!["Name", "Email"]);
    }

    #[test]
    fn test_writes_camel_case() {
        let json = serde_json::to_value(configured()).unwrap();
        assert_eq!(json["credentialRef"], "AIzaSyExampleKey");
        assert_eq!(json["sourceId"], "1VvBc");
        assert!(json.get("relayUrl").is_none());
    }
}
