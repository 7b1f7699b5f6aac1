//! Path management for ReLive client files.
//!
//! ```text
//! ~/.config/relive/
//! ├── config.toml     # ClientConfig
//! └── session.toml    # access/refresh tokens (0600)
//! ```

use std::path::{Path, PathBuf};

/// The platform offers no place for per-user configuration.
#[derive(Debug)]
pub enum PathError {
    NoConfigDir,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoConfigDir => f.write_str("no per-user configuration directory is available"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for relive_core::ReliveError {
    fn from(e: PathError) -> Self {
        relive_core::ReliveError::config(e.to_string())
    }
}

const APP_DIR: &str = "relive";

/// Resolves where the client keeps its files.
///
/// With a base path every file lives directly under it, which is what tests use.
/// Without one the platform config directory is used.
#[derive(Debug, Clone, Default)]
pub struct RelivePaths {
    base: Option<PathBuf>,
}

impl RelivePaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory (e.g. `~/.config/relive/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::NoConfigDir),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path of the persisted session.
    ///
    /// The file holds live credentials and is written with 0600 permissions.
    pub fn session_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("session.toml"))
    }
}
