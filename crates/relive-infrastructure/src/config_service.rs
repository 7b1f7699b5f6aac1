//! Configuration service.
//!
//! Loads [`ClientConfig`] from `~/.config/relive/config.toml` and applies
//! environment overrides on top.

use relive_core::config::ClientConfig;
use relive_core::{ReliveError, Result};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::paths::RelivePaths;
use crate::storage::AtomicTomlFile;

pub const ENV_API_URL: &str = "RELIVE_API_URL";
pub const ENV_REFRESH_THRESHOLD_SECS: &str = "RELIVE_REFRESH_THRESHOLD_SECS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "RELIVE_REQUEST_TIMEOUT_SECS";

/// Loads and caches the client configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &RelivePaths) -> Result<Self> {
        Ok(Self::with_path(paths.config_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading it on first access.
    ///
    /// A missing file yields the defaults; an unreadable one is an error.
    pub fn get_config(&self) -> Result<ClientConfig> {
        if let Ok(cached) = self.config.read()
            && let Some(config) = cached.as_ref()
        {
            return Ok(config.clone());
        }

        let loaded = self.load(|key| std::env::var(key).ok())?;
        if let Ok(mut cache) = self.config.write() {
            *cache = Some(loaded.clone());
        }
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.config.write() {
            *cache = None;
        }
    }

    /// Loads the file and applies overrides from `lookup`.
    pub fn load<F>(&self, lookup: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = AtomicTomlFile::<ClientConfig>::new(self.path.clone());
        let mut config = match file.load()? {
            Some(config) => config,
            None => {
                tracing::debug!(
                    "[Config] No config file at {}, using defaults",
                    self.path.display()
                );
                ClientConfig::default()
            }
        };
        apply_env_overrides(&mut config, lookup)?;
        Ok(config)
    }
}

/// Applies `RELIVE_*` overrides found by `lookup`.
pub fn apply_env_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
        config.api_base_url = url.trim().to_string();
    }
    if let Some(value) = lookup(ENV_REFRESH_THRESHOLD_SECS) {
        config.refresh_threshold_secs = parse_secs(ENV_REFRESH_THRESHOLD_SECS, &value)?;
    }
    if let Some(value) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
        config.request_timeout_secs = parse_secs(ENV_REQUEST_TIMEOUT_SECS, &value)?;
    }
    Ok(())
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        ReliveError::config(format!("{} must be a number of seconds, got '{}'", key, value))
    })
}
