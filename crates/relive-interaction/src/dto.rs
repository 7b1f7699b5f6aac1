//! Wire formats of the authentication endpoints.

use relive_core::family::PatientSummary;
use relive_core::session::AuthTokens;
use relive_core::user::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ConnectRequest<'a> {
    pub code: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LinkedPatient {
    pub id: u64,
    pub username: String,
}

/// Answer of `POST /family-links/connect/`.
#[derive(Debug, Deserialize)]
pub struct ConnectResponse {
    pub patient: LinkedPatient,
}

impl ConnectResponse {
    pub fn into_patient(self) -> PatientSummary {
        PatientSummary {
            id: self.patient.id,
            username: self.patient.username,
            name: None,
            relation: String::new(),
        }
    }
}

/// Token pair returned by login, register, and refresh.
///
/// The refresh endpoint may omit `refresh`, in which case the previous one stays valid.
#[derive(Deserialize)]
pub struct TokenPairResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl TokenPairResponse {
    /// Combines the response with the refresh token to keep when none was issued.
    pub fn into_tokens(self, previous_refresh: &str) -> AuthTokens {
        let refresh = self
            .refresh
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| previous_refresh.to_string());
        AuthTokens::new(self.access, refresh)
    }
}
