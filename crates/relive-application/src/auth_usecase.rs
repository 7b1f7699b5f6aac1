//! Authentication use case.
//!
//! The only place where a new session is established.

use relive_core::session::Session;
use relive_core::user::{Role, UserProfile};
use relive_core::{ReliveError, Result};
use relive_interaction::ReliveApi;

pub struct AuthUseCase {
    api: ReliveApi,
}

impl AuthUseCase {
    pub fn new(api: ReliveApi) -> Self {
        Self { api }
    }

    /// Logs in with an email (or username) and password and stores the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let tokens = self.api.login(email.trim(), password).await?;
        tracing::info!("[Auth] Logged in");
        self.api.tokens().establish(tokens).await
    }

    /// Creates an account and stores the session it comes with.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Session> {
        if username.trim().is_empty() {
            return Err(ReliveError::InvalidDraft("username is required".to_string()));
        }
        let tokens = self
            .api
            .register(username.trim(), email.trim(), password, role)
            .await?;
        tracing::info!("[Auth] Registered new {} account", role);
        self.api.tokens().establish(tokens).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.api.tokens().clear().await
    }

    pub async fn current_user(&self) -> Result<UserProfile> {
        self.api.current_user().await
    }

    /// Resumes a stored session at startup.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(profile))`: The stored session is still accepted
    /// - `Ok(None)`: No session, or the server no longer accepts it
    /// - `Err(_)`: The server could not be asked
    pub async fn restore(&self) -> Result<Option<UserProfile>> {
        if self.api.tokens().current_session().await?.is_none() {
            return Ok(None);
        }

        match self.api.current_user().await {
            Ok(profile) => {
                tracing::info!("[Auth] Restored session for {}", profile.username);
                Ok(Some(profile))
            }
            Err(e) if e.is_session_expired() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
