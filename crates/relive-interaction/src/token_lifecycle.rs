//! TokenLifecycleManager - keeps the access token usable.
//!
//! Refreshes are single-flight: every refresh attempt goes through one async
//! gate, and a caller that queued behind another refresh re-reads the store
//! before deciding to call the server itself.

use chrono::{Duration, Utc};
use relive_core::http::HttpTransport;
use relive_core::session::{AuthTokens, Session, SessionEvent, SessionStore};
use relive_core::{ReliveError, Result};
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};

use crate::dto::TokenPairResponse;
use crate::routes;

const EVENT_CAPACITY: usize = 16;

pub struct TokenLifecycleManager {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn SessionStore>,
    refresh_gate: Mutex<()>,
    threshold: Duration,
    events: broadcast::Sender<SessionEvent>,
}

impl TokenLifecycleManager {
    /// # Arguments
    ///
    /// * `threshold` - Minimum remaining lifetime for a token to be used as is
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn SessionStore>,
        threshold: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            transport,
            store,
            refresh_gate: Mutex::new(()),
            threshold,
            events,
        }
    }

    /// Subscribes to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Returns the stored session, if any.
    pub async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.store.load().await?.map(Session::from_tokens))
    }

    /// Stores a freshly issued token pair (login or registration).
    pub async fn establish(&self, tokens: AuthTokens) -> Result<Session> {
        let _gate = self.refresh_gate.lock().await;
        self.store.save(&tokens).await?;
        tracing::info!("[TokenLifecycle] Session established");
        self.emit(SessionEvent::Established);
        Ok(Session::from_tokens(tokens))
    }

    /// Removes the session on purpose (logout).
    pub async fn clear(&self) -> Result<()> {
        let _gate = self.refresh_gate.lock().await;
        self.store.clear().await?;
        tracing::info!("[TokenLifecycle] Session cleared");
        self.emit(SessionEvent::Cleared);
        Ok(())
    }

    /// Returns an access token that can be sent right away.
    ///
    /// Refreshes first when less than the threshold of lifetime remains or the
    /// token cannot be decoded.
    ///
    /// # Returns
    ///
    /// - `Ok(token)`: A usable access token
    /// - `Err(SessionExpired)`: No session, or the refresh was rejected
    /// - `Err(Transport)`: The refresh endpoint could not be reached; the session is kept
    pub async fn get_usable_access_token(&self) -> Result<String> {
        let session = self
            .current_session()
            .await?
            .ok_or(ReliveError::SessionExpired)?;

        if session.is_usable(Utc::now(), self.threshold) {
            return Ok(session.access_token);
        }

        tracing::debug!("[TokenLifecycle] Access token near expiry, refreshing");
        self.refresh_unless_replaced(&session.access_token).await
    }

    /// Exchanges the refresh token unconditionally.
    pub async fn force_refresh(&self) -> Result<String> {
        let _gate = self.refresh_gate.lock().await;
        let session = self.load_locked().await?;
        self.refresh_locked(session).await
    }

    /// Recovers from a 401 on `rejected_token`.
    ///
    /// When another caller already replaced that token, the newer one is returned
    /// without contacting the server.
    pub async fn refresh_after_rejection(&self, rejected_token: &str) -> Result<String> {
        self.refresh_unless_replaced(rejected_token).await
    }

    /// Ends a session the server no longer accepts.
    ///
    /// Only the session that issued `rejected_token` is cleared; a pair
    /// stored since then by another caller is kept.
    pub async fn invalidate(&self, rejected_token: &str) {
        let _gate = self.refresh_gate.lock().await;
        match self.current_session().await {
            Ok(Some(session)) if session.access_token != rejected_token => {
                tracing::debug!("[TokenLifecycle] Rejected token already replaced, keeping session");
            }
            Ok(None) => {}
            _ => self.expire_locked().await,
        }
    }

    async fn refresh_unless_replaced(&self, stale_token: &str) -> Result<String> {
        let _gate = self.refresh_gate.lock().await;
        let session = self.load_locked().await?;

        if session.access_token != stale_token {
            tracing::debug!("[TokenLifecycle] Token already replaced by a concurrent refresh");
            return Ok(session.access_token);
        }

        self.refresh_locked(session).await
    }

    async fn load_locked(&self) -> Result<Session> {
        self.current_session()
            .await?
            .ok_or(ReliveError::SessionExpired)
    }

    /// Performs the refresh call. The gate must be held.
    async fn refresh_locked(&self, session: Session) -> Result<String> {
        if !session.has_refresh_token() {
            tracing::warn!("[TokenLifecycle] No refresh token stored");
            self.expire_locked().await;
            return Err(ReliveError::SessionExpired);
        }

        tracing::info!("[TokenLifecycle] Refreshing access token");
        let request = routes::refresh(&session.refresh_token).anonymous();
        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("[TokenLifecycle] Refresh request failed: {}", e);
                return Err(e);
            }
        };

        if !response.is_success() {
            tracing::warn!(
                "[TokenLifecycle] Refresh rejected with status {}",
                response.status
            );
            self.expire_locked().await;
            return Err(ReliveError::SessionExpired);
        }

        let pair: TokenPairResponse = response.json()?;
        let tokens = pair.into_tokens(&session.refresh_token);
        self.store.save(&tokens).await?;
        self.emit(SessionEvent::Refreshed);

        Ok(tokens.access)
    }

    async fn expire_locked(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::warn!("[TokenLifecycle] Failed to clear session: {}", e);
        }
        self.emit(SessionEvent::ReauthenticationRequired);
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
