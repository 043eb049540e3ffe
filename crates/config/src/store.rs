// Configuration persistence
// Default location: <config_dir>/sheetseek/config.json

use crate::source::{ConfigPatch, SourceConfig};
use sheetseek_core::{SeekError, SeekResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key-value persistence for [`SourceConfig`]. No validation happens here.
pub trait ConfigStore: Send + Sync {
    /// Current configuration; defaults when nothing is stored.
    fn get_config(&self) -> SeekResult<SourceConfig>;

    /// Merge `patch` into the stored configuration and return the result.
    fn set_config(&self, patch: ConfigPatch) -> SeekResult<SourceConfig>;

    /// Forget everything stored.
    fn clear_config(&self) -> SeekResult<()>;
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform config directory.
    pub fn open_default() -> SeekResult<Self> {
        Self::default_path()
            .map(Self::new)
            .ok_or_else(|| SeekError::Config("no configuration directory on this platform".into()))
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("sheetseek");
            p.push("config.json");
            p
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, config: &SourceConfig) -> SeekResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl ConfigStore for FileConfigStore {
    fn get_config(&self) -> SeekResult<SourceConfig> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SourceConfig::default()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "error parsing config, using defaults: {e}"
                );
                Ok(SourceConfig::default())
            }
        }
    }

    fn set_config(&self, patch: ConfigPatch) -> SeekResult<SourceConfig> {
        let mut config = self.get_config()?;
        config.apply(patch);
        self.write(&config)?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(config)
    }

    fn clear_config(&self) -> SeekResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Mutex<SourceConfig>,
}

impl MemoryConfigStore {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }

    fn lock(&self) -> SeekResult<std::sync::MutexGuard<'_, SourceConfig>> {
        self.config
            .lock()
            .map_err(|_| SeekError::Config("config lock poisoned".into()))
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_config(&self) -> SeekResult<SourceConfig> {
        Ok(self.lock()?.clone())
    }

    fn set_config(&self, patch: ConfigPatch) -> SeekResult<SourceConfig> {
        let mut config = self.lock()?;
        config.apply(patch);
        Ok(config.clone())
    }

    fn clear_config(&self) -> SeekResult<()> {
        *self.lock()? = SourceConfig::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_missing_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("config.json"));
        assert_eq!(store.get_config().unwrap(), SourceConfig::default());
    }

    #[test]
    fn test_file_set_then_get() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("nested").join("config.json"));

        let saved = store
            .set_config(ConfigPatch {
                source_id: Some("abc".to_string()),
                credential_ref: Some("env:GOOGLE_API_KEY".to_string()),
                ..ConfigPatch::default()
            })
            .unwrap();
        assert_eq!(saved.source_id, "abc");

        store
            .set_config(ConfigPatch::selected_fields(vec!["Name".to_string()]))
            .unwrap();

        let loaded = FileConfigStore::new(store.path()).get_config().unwrap();
        assert_eq!(loaded.source_id, "abc");
        assert_eq!(loaded.credential_ref, "env:GOOGLE_API_KEY");
        assert_eq!(loaded.last_selected_fields, vec!["Name"]);
    }

    #[test]
    fn test_file_corrupt_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileConfigStore::new(&path);
        assert_eq!(store.get_config().unwrap(), SourceConfig::default());
    }

    #[test]
    fn test_file_clear() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("config.json"));
        store
            .set_config(ConfigPatch {
                source_id: Some("abc".to_string()),
                ..ConfigPatch::default()
            })
            .unwrap();

        store.clear_config().unwrap();
        assert!(!store.path().exists());
        store.clear_config().unwrap();
        assert_eq!(store.get_config().unwrap(), SourceConfig::default());
    }

    #[test]
    fn test_default_path_name() {
        if let Some(path) = FileConfigStore::default_path() {
            assert!(path.ends_with("sheetseek/config.json"));
        }
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryConfigStore::default();
        let config = store
            .set_config(ConfigPatch {
                source_id: Some("abc".to_string()),
                ..ConfigPatch::default()
            })
            .unwrap();
        assert_eq!(config.source_id, "abc");
        assert_eq!(store.get_config().unwrap().source_id, "abc");

        store.clear_config().unwrap();
        assert_eq!(store.get_config().unwrap(), SourceConfig::default());
    }
}
