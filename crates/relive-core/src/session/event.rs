use serde::{Deserialize, Serialize};

/// Out-of-band session lifecycle notifications.
///
/// Published by the token lifecycle manager; the UI subscribes to learn when it
/// has to send the user back to the login screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A fresh session was stored after login or registration.
    Established,
    /// The access token was exchanged for a new one.
    Refreshed,
    /// The session was removed on purpose (logout).
    Cleared,
    /// The session could not be recovered; the user must log in again.
    ReauthenticationRequired,
}
