//! AuthenticatedRequestClient - sends requests with the session's credentials.

use relive_core::http::{HttpResponse, HttpTransport, RequestSpec};
use relive_core::{ReliveError, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::token_lifecycle::TokenLifecycleManager;

/// Attaches `Authorization: Bearer <access>` and recovers from one 401.
///
/// A rejected request is retried exactly once after a refresh. A second 401
/// ends the session.
#[derive(Clone)]
pub struct AuthenticatedRequestClient {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<TokenLifecycleManager>,
}

impl AuthenticatedRequestClient {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: Arc<TokenLifecycleManager>) -> Self {
        Self { transport, tokens }
    }

    pub fn tokens(&self) -> &Arc<TokenLifecycleManager> {
        &self.tokens
    }

    /// Sends `spec` and returns the 2xx response.
    ///
    /// # Returns
    ///
    /// - `Ok(response)`: The server answered 2xx
    /// - `Err(SessionExpired)`: No usable session, or the retry was rejected too
    /// - `Err(RequestFailed)`: Any other non-2xx status, body unmodified
    /// - `Err(Transport)`: No response was obtained
    pub async fn request(&self, spec: RequestSpec) -> Result<HttpResponse> {
        let token = self.tokens.get_usable_access_token().await?;
        let response = self
            .transport
            .execute(spec.clone().authorized(token.clone()))
            .await?;

        if !response.is_unauthorized() {
            return into_result(response);
        }

        tracing::info!(
            "[AuthClient] {} {} rejected with 401, refreshing and retrying once",
            spec.method,
            spec.path
        );
        let token = self.tokens.refresh_after_rejection(&token).await?;
        let retry = self
            .transport
            .execute(spec.authorized(token.clone()))
            .await?;

        if retry.is_unauthorized() {
            tracing::warn!("[AuthClient] Retry rejected with 401, ending session");
            self.tokens.invalidate(&token).await;
            return Err(ReliveError::SessionExpired);
        }

        into_result(retry)
    }

    /// Sends `spec` and deserializes the 2xx body.
    pub async fn request_json<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T> {
        self.request(spec).await?.json()
    }

    /// Best-effort fetch: any failure is logged and yields `None`.
    pub async fn request_optional<T: DeserializeOwned>(&self, spec: RequestSpec) -> Option<T> {
        let path = spec.path.clone();
        match self.request_json(spec).await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("[AuthClient] Optional fetch of {} failed: {}", path, e);
                None
            }
        }
    }
}

fn into_result(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ReliveError::request_failed(response.status, response.body))
    }
}
