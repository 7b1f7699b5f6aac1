//! Session store port.

use super::model::AuthTokens;
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Durable holder of the current credentials.
///
/// Components never read ambient storage; they receive a `SessionStore`.
/// Implementations hold at most one token pair at a time.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the stored token pair.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(tokens))`: A session is stored
    /// - `Ok(None)`: No session
    /// - `Err(_)`: The backing storage could not be read
    async fn load(&self) -> Result<Option<AuthTokens>>;

    /// Replaces the stored token pair.
    async fn save(&self, tokens: &AuthTokens) -> Result<()>;

    /// Removes the stored token pair. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<()>;
}

/// A store that keeps the tokens in process memory only.
#[derive(Default)]
pub struct InMemorySessionStore {
    tokens: RwLock<Option<AuthTokens>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `tokens`.
    pub fn with_tokens(tokens: AuthTokens) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self) -> Result<Option<AuthTokens>> {
        Ok(self.tokens.read().await.clone())
    }

    async fn save(&self, tokens: &AuthTokens) -> Result<()> {
        *self.tokens.write().await = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.tokens.write().await = None;
        Ok(())
    }
}
