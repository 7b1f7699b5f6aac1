//! Audio capture ports and observable capture state.

mod port;
mod state;

pub use crate::error::CaptureError;
pub use port::{AudioInput, AudioStream, StreamGuard};
pub use state::CaptureState;

/// MIME type of finished recordings.
pub const RECORDING_MIME_TYPE: &str = "audio/webm";
