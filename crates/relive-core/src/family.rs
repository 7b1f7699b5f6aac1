//! Family links between patients and the family members who keep memories for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ReliveError, Result};

/// A patient the logged-in family member is linked to.
///
/// `id` is what a memory's `patient_id` refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub relation: String,
}

impl PatientSummary {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// A one-time code a patient hands out so a family member can link to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl ConnectCode {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Normalizes a code typed by a family member.
///
/// Codes are case-insensitive and surrounding whitespace is ignored.
pub fn normalize_connect_code(code: &str) -> Result<String> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ReliveError::InvalidDraft("connect code is required".to_string()));
    }
    Ok(code)
}
