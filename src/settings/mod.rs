use crate::config::ProxyConfig;
use crate::error::Result;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Where the application keeps the user's proxy settings.
///
/// Contract: single writer, last write wins. `save` replaces the stored
/// value wholesale; partial updates do not exist.
pub trait SettingsStore {
    /// `None` when nothing has been saved yet; callers fall back to
    /// [`ProxyConfig::direct`].
    fn load(&self) -> Result<Option<ProxyConfig>>;
    fn save(&self, config: &ProxyConfig) -> Result<()>;
}

/// Settings persisted as a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Option<ProxyConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let config: ProxyConfig = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), "loaded proxy settings");
        Ok(Some(config))
    }

    fn save(&self, config: &ProxyConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "saved proxy settings");
        Ok(())
    }
}
