//! Error types for the ReLive client.

use thiserror::Error;

/// Failures raised by the media capture state machine.
///
/// Every variant maps to a distinct message shown to the user, see
/// [`CaptureError::user_message`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The user (or the platform) refused microphone access.
    #[error("Microphone permission denied")]
    PermissionDenied,

    /// No capture device is attached.
    #[error("No microphone found")]
    DeviceNotFound,

    /// The platform cannot record audio at all.
    #[error("Audio recording is not supported: {0}")]
    Unsupported(String),

    /// Recording stopped before any audio data arrived.
    #[error("Recording is empty")]
    EmptyRecording,

    /// The encoder stream broke while recording.
    #[error("Recording stream failed: {0}")]
    StreamFailed(String),
}

impl CaptureError {
    /// Returns the message shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Microphone access was denied. Allow microphone access to record a voice note."
            }
            Self::DeviceNotFound => "No microphone was found. Connect one and try again.",
            Self::Unsupported(_) => "Voice recording is not supported on this device.",
            Self::EmptyRecording => "Nothing was recorded. Please try again.",
            Self::StreamFailed(_) => "The recording was interrupted. Please try again.",
        }
    }
}

/// A shared error type for the entire ReLive client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReliveError {
    /// The session cannot be refreshed; the user must authenticate again.
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// The server answered with a non-2xx status other than 401.
    #[error("Request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// Creating or updating the base memory record failed; nothing was uploaded.
    #[error("Failed to save memory: {source}")]
    MemoryPersistFailed { source: Box<ReliveError> },

    /// A single asset upload failed. Recorded per asset, never aborts siblings.
    #[error("Upload of asset '{asset_id}' failed: {reason}")]
    AssetUploadFailed { asset_id: String, reason: String },

    /// Media capture failure
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// An operation was requested in a state that does not allow it.
    #[error("Invalid transition: cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: String,
    },

    /// The draft is missing required fields.
    #[error("Invalid draft: {0}")]
    InvalidDraft(String),

    /// Another mutation on the same target has not resolved yet.
    #[error("A change to '{0}' is already in progress")]
    MutationInFlight(String),

    /// A memory, asset, or other entity is unknown.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// No HTTP response was obtained (connect error, timeout, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A payload or file could not be encoded or decoded.
    #[error("Invalid {format}: {message}")]
    Serialization { format: String, message: String },

    /// Local file access failed.
    #[error("I/O failure: {message}")]
    Io { message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A broken invariant, e.g. a background task that panicked.
    #[error("Unexpected internal state: {0}")]
    Internal(String),
}

impl ReliveError {
    /// Creates a RequestFailed error
    pub fn request_failed(status: u16, body: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            body: body.into(),
        }
    }

    /// Wraps the cause of a failed base-memory save.
    pub fn memory_persist_failed(source: ReliveError) -> Self {
        Self::MemoryPersistFailed {
            source: Box::new(source),
        }
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an InvalidTransition error
    pub fn invalid_transition(action: &'static str, state: impl std::fmt::Display) -> Self {
        Self::InvalidTransition {
            action,
            state: state.to_string(),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Check if the user has to authenticate again.
    ///
    /// Also looks through a wrapped [`ReliveError::MemoryPersistFailed`], since a
    /// base-memory save can fail because the session ended.
    pub fn is_session_expired(&self) -> bool {
        match self {
            Self::SessionExpired => true,
            Self::MemoryPersistFailed { source } => source.is_session_expired(),
            _ => false,
        }
    }

    /// Returns the HTTP status if this error came from a server response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::MemoryPersistFailed { source } => source.status(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ReliveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} ({:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ReliveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error, used at the infrastructure boundary.
impl From<anyhow::Error> for ReliveError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, ReliveError>`.
pub type Result<T> = std::result::Result<T, ReliveError>;
