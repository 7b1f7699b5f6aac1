//! UserProfile domain model.

use serde::{Deserialize, Serialize};

/// Role chosen at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Family,
    Patient,
}

impl std::str::FromStr for Role {
    type Err = crate::ReliveError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "family" => Ok(Self::Family),
            "patient" => Ok(Self::Patient),
            other => Err(crate::ReliveError::InvalidDraft(format!(
                "unknown role '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Family => f.write_str("family"),
            Self::Patient => f.write_str("patient"),
        }
    }
}

/// The profile returned by `GET /auth/me/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub role: Role,
    pub username: String,
    /// URL of the profile picture; display is best-effort.
    #[serde(default)]
    pub profile_picture: Option<String>,
}
