use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::token::decode_expiry;

/// The credential pair issued by login, register, or refresh.
///
/// This is the only part of a session that is persisted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    /// Short-lived bearer credential
    pub access: String,
    /// Longer-lived credential exchanged for a new access token
    pub refresh: String,
}

impl AuthTokens {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

// Tokens must never end up in logs.
impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// The authenticated session of this client instance.
///
/// `access_expiry` is always derived from the access token's own `exp` claim.
/// `None` means the token could not be decoded and must be treated as expired.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub access_expiry: Option<DateTime<Utc>>,
    pub refresh_token: String,
}

impl Session {
    /// Builds a session from a stored token pair, decoding the access expiry.
    pub fn from_tokens(tokens: AuthTokens) -> Self {
        let access_expiry = decode_expiry(&tokens.access);
        if access_expiry.is_none() {
            tracing::debug!("[Session] Access token carries no readable exp claim");
        }
        Self {
            access_token: tokens.access,
            access_expiry,
            refresh_token: tokens.refresh,
        }
    }

    /// Returns the token pair to persist.
    pub fn tokens(&self) -> AuthTokens {
        AuthTokens::new(self.access_token.clone(), self.refresh_token.clone())
    }

    /// Remaining lifetime of the access token at `now`, or `None` if undecodable.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.access_expiry.map(|expiry| expiry - now)
    }

    /// Whether the access token can still be sent without refreshing first.
    ///
    /// The token is usable while more than `threshold` of its lifetime remains.
    pub fn is_usable(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.remaining_lifetime(now)
            .is_some_and(|remaining| remaining > threshold)
    }

    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.trim().is_empty()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_expiry", &self.access_expiry)
            .field("has_refresh_token", &self.has_refresh_token())
            .finish()
    }
}
