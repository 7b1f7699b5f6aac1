use async_trait::async_trait;
use bytes::Bytes;

use crate::error::CaptureError;

/// A live, encoded audio stream bound to capture hardware.
///
/// Holding a stream means holding the microphone. Implementations must make
/// `release` idempotent.
#[async_trait]
pub trait AudioStream: Send {
    /// Waits for the next encoded chunk.
    ///
    /// Returns `Ok(None)` once the encoder has finished after `request_stop`.
    /// Must be cancel-safe: a dropped call loses no data.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, CaptureError>;

    /// Asks the encoder to flush what it holds and finish.
    fn request_stop(&mut self);

    /// Releases the capture hardware.
    fn release(&mut self);
}

/// Access to the platform microphone.
#[async_trait]
pub trait AudioInput: Send + Sync {
    /// Requests permission and opens a capture stream.
    ///
    /// Fails with `PermissionDenied`, `DeviceNotFound` or `Unsupported`.
    async fn open(&self) -> Result<Box<dyn AudioStream>, CaptureError>;
}

/// Owns an [`AudioStream`] and releases it when dropped.
pub struct StreamGuard {
    stream: Box<dyn AudioStream>,
    released: bool,
}

impl StreamGuard {
    pub fn new(stream: Box<dyn AudioStream>) -> Self {
        Self {
            stream,
            released: false,
        }
    }

    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, CaptureError> {
        self.stream.next_chunk().await
    }

    pub fn request_stop(&mut self) {
        self.stream.request_stop();
    }

    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.stream.release();
        }
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for StreamGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamGuard")
            .field("released", &self.released)
            .finish()
    }
}
