//! Access token expiry decoding.
//!
//! Access tokens are JWTs. The client never verifies them; it only reads the
//! `exp` claim from the payload segment to decide when to refresh.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    #[serde(default)]
    exp: Option<i64>,
}

/// Reads the `exp` claim of a JWT.
///
/// Returns `None` when the token is not a three-segment JWT, when the payload is
/// not base64url JSON, or when it carries no `exp` claim. Callers treat `None`
/// as "already expired".
pub fn decode_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut segments = token.split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }

    // Some issuers keep the padding
    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claim: ExpiryClaim = serde_json::from_slice(&bytes).ok()?;

    DateTime::from_timestamp(claim.exp?, 0)
}
