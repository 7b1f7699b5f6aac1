//! File-backed session store.

use async_trait::async_trait;
use relive_core::Result;
use relive_core::session::{AuthTokens, SessionStore};
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::paths::RelivePaths;
use crate::storage::AtomicTomlFile;

/// Persists the token pair to `session.toml` so a session survives restarts.
///
/// The file is written atomically with owner-only permissions and deleted on
/// `clear`. Loaded tokens are cached; this store assumes it is the only writer.
pub struct FileSessionStore {
    file: AtomicTomlFile<AuthTokens>,
    cache: RwLock<Option<Option<AuthTokens>>>,
}

impl FileSessionStore {
    /// Creates a store at the default location (`~/.config/relive/session.toml`).
    pub fn new(paths: &RelivePaths) -> Result<Self> {
        Ok(Self::with_path(paths.session_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::private(path),
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<AuthTokens>> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let mut cache = self.cache.write().await;
        if let Some(cached) = cache.as_ref() {
            return Ok(cached.clone());
        }

        let loaded = self.file.load()?;
        tracing::debug!(
            "[SessionStore] Loaded session file {} (present: {})",
            self.file.path().display(),
            loaded.is_some()
        );
        *cache = Some(loaded.clone());
        Ok(loaded)
    }

    async fn save(&self, tokens: &AuthTokens) -> Result<()> {
        let mut cache = self.cache.write().await;
        self.file.save(tokens)?;
        *cache = Some(Some(tokens.clone()));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut cache = self.cache.write().await;
        self.file.remove()?;
        *cache = Some(None);
        tracing::debug!("[SessionStore] Session file removed");
        Ok(())
    }
}
