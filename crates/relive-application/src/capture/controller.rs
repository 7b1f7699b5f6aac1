//! MediaCaptureController - turns a live microphone stream into an audio asset.
//!
//! ```text
//! Idle ──start──▶ RequestingPermission ──granted──▶ Recording ──stop──▶ Stopping ──▶ Idle
//!                        │                              │
//!                        └────────denied──▶ Error ◀─────┘ stream failure
//! ```
//!
//! The stream lives inside the pump task, which only exists while recording.
//! Aborting the task drops the stream guard and releases the microphone.

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use relive_core::capture::{
    AudioInput, CaptureError, CaptureState, RECORDING_MIME_TYPE, StreamGuard,
};
use relive_core::media::{AssetKind, AssetOrigin, MediaAsset};
use relive_core::{ReliveError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinHandle};

type ChunkBuffer = Arc<Mutex<Vec<Bytes>>>;
type FailureSlot = Arc<Mutex<Option<CaptureError>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct ActiveRecording {
    started_at: DateTime<Utc>,
    stop_tx: oneshot::Sender<()>,
    pump: JoinHandle<std::result::Result<(), CaptureError>>,
    ticker: JoinHandle<()>,
}

impl ActiveRecording {
    fn abort(&self) {
        self.ticker.abort();
        self.pump.abort();
    }
}

enum Phase {
    Idle,
    RequestingPermission,
    Recording(ActiveRecording),
    Stopping,
    Error(CaptureError),
}

pub struct MediaCaptureController {
    input: Arc<dyn AudioInput>,
    phase: Phase,
    chunks: ChunkBuffer,
    elapsed: Arc<AtomicU64>,
    failure: FailureSlot,
}

impl MediaCaptureController {
    pub fn new(input: Arc<dyn AudioInput>) -> Self {
        Self {
            input,
            phase: Phase::Idle,
            chunks: Arc::new(Mutex::new(Vec::new())),
            elapsed: Arc::new(AtomicU64::new(0)),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn state(&self) -> CaptureState {
        match &self.phase {
            Phase::Idle => CaptureState::Idle,
            Phase::RequestingPermission => CaptureState::RequestingPermission,
            Phase::Recording(_) => match lock(&self.failure).clone() {
                Some(error) => CaptureState::Error(error),
                None => CaptureState::Recording,
            },
            Phase::Stopping => CaptureState::Stopping,
            Phase::Error(error) => CaptureState::Error(error.clone()),
        }
    }

    /// Whole seconds spent recording so far.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed.load(Ordering::SeqCst)
    }

    pub fn buffered_bytes(&self) -> usize {
        lock(&self.chunks).iter().map(Bytes::len).sum()
    }

    /// Acquires the microphone and begins buffering audio.
    ///
    /// Allowed from `Idle` and `Error`. On refusal the controller moves to
    /// `Error` and the capture error is returned.
    pub async fn start(&mut self) -> Result<()> {
        self.settle_failure();
        if !self.state().can_start() {
            return Err(ReliveError::invalid_transition("start", self.state()));
        }

        self.phase = Phase::RequestingPermission;
        lock(&self.chunks).clear();
        *lock(&self.failure) = None;
        self.elapsed.store(0, Ordering::SeqCst);

        let stream = match self.input.open().await {
            Ok(stream) => StreamGuard::new(stream),
            Err(error) => {
                tracing::warn!("[Capture] Could not open microphone: {}", error);
                self.phase = Phase::Error(error.clone());
                return Err(error.into());
            }
        };

        let (stop_tx, stop_rx) = oneshot::channel();
        let ticker = tokio::spawn(run_ticker(self.elapsed.clone()));
        let pump = tokio::spawn(run_pump(
            stream,
            stop_rx,
            self.chunks.clone(),
            self.failure.clone(),
            ticker.abort_handle(),
        ));

        tracing::info!("[Capture] Recording started");
        self.phase = Phase::Recording(ActiveRecording {
            started_at: Utc::now(),
            stop_tx,
            pump,
            ticker,
        });
        Ok(())
    }

    /// Finishes the recording and returns it as an audio asset.
    ///
    /// Allowed only from `Recording`. An empty recording yields
    /// `EmptyRecording` and no asset; the controller is back in `Idle` either way.
    pub async fn stop(&mut self) -> Result<MediaAsset> {
        self.settle_failure();
        let active = match std::mem::replace(&mut self.phase, Phase::Stopping) {
            Phase::Recording(active) => active,
            other => {
                self.phase = other;
                return Err(ReliveError::invalid_transition("stop", self.state()));
            }
        };

        active.ticker.abort();
        // The pump may already have finished on its own
        let _ = active.stop_tx.send(());

        let drained = match active.pump.await {
            Ok(result) => result,
            Err(e) => Err(CaptureError::StreamFailed(e.to_string())),
        };
        if let Err(error) = drained {
            tracing::warn!("[Capture] Recording failed while stopping: {}", error);
            lock(&self.chunks).clear();
            self.phase = Phase::Error(error.clone());
            return Err(error.into());
        }

        let chunks = std::mem::take(&mut *lock(&self.chunks));
        self.phase = Phase::Idle;

        if chunks.is_empty() {
            tracing::info!("[Capture] Recording stopped without data");
            return Err(CaptureError::EmptyRecording.into());
        }

        let mut payload = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
        for chunk in &chunks {
            payload.extend_from_slice(chunk);
        }

        tracing::info!(
            "[Capture] Recording finished ({} chunks, {} bytes, {}s)",
            chunks.len(),
            payload.len(),
            self.elapsed_seconds()
        );

        Ok(MediaAsset::local(
            AssetKind::Audio,
            AssetOrigin::Recording,
            format!("recording-{}.webm", active.started_at.format("%Y%m%d-%H%M%S")),
            RECORDING_MIME_TYPE,
            payload.freeze(),
        ))
    }

    /// Releases the microphone and stops all background work.
    ///
    /// Safe from any state; afterwards the controller is `Idle`.
    pub async fn teardown(&mut self) {
        if let Phase::Recording(active) = std::mem::replace(&mut self.phase, Phase::Idle) {
            active.abort();
            // Wait until the pump future is dropped so the stream is released
            let _ = active.pump.await;
            tracing::info!("[Capture] Recording discarded");
        }
        lock(&self.chunks).clear();
        self.elapsed.store(0, Ordering::SeqCst);
    }

    /// Moves a recording whose stream broke into `Error`.
    fn settle_failure(&mut self) {
        let Some(error) = lock(&self.failure).clone() else {
            return;
        };
        if let Phase::Recording(active) = &self.phase {
            active.abort();
            lock(&self.chunks).clear();
            self.phase = Phase::Error(error);
        }
    }
}

impl Drop for MediaCaptureController {
    fn drop(&mut self) {
        if let Phase::Recording(active) = &self.phase {
            active.abort();
        }
    }
}

async fn run_ticker(elapsed: Arc<AtomicU64>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick completes immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        elapsed.fetch_add(1, Ordering::SeqCst);
    }
}

fn push_chunk(chunks: &ChunkBuffer, chunk: Bytes) {
    if !chunk.is_empty() {
        lock(chunks).push(chunk);
    }
}

async fn run_pump(
    mut stream: StreamGuard,
    mut stop_rx: oneshot::Receiver<()>,
    chunks: ChunkBuffer,
    failure: FailureSlot,
    ticker: AbortHandle,
) -> std::result::Result<(), CaptureError> {
    loop {
        let next = tokio::select! {
            _ = &mut stop_rx => None,
            chunk = stream.next_chunk() => Some(chunk),
        };

        match next {
            None => break,
            Some(Ok(Some(chunk))) => push_chunk(&chunks, chunk),
            Some(Ok(None)) => {
                // Encoder finished on its own; keep what we have until stop
                let _ = stop_rx.await;
                stream.release();
                return Ok(());
            }
            Some(Err(error)) => {
                tracing::warn!("[Capture] Stream failed: {}", error);
                ticker.abort();
                stream.release();
                *lock(&failure) = Some(error.clone());
                return Err(error);
            }
        }
    }

    stream.request_stop();
    loop {
        match stream.next_chunk().await {
            Ok(Some(chunk)) => push_chunk(&chunks, chunk),
            Ok(None) => break,
            Err(error) => {
                stream.release();
                return Err(error);
            }
        }
    }
    stream.release();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use relive_core::capture::AudioStream;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use tokio::sync::mpsc;

    type ChunkResult = std::result::Result<Bytes, CaptureError>;

    struct FakeStream {
        rx: mpsc::UnboundedReceiver<ChunkResult>,
        flush: Option<Bytes>,
        open: Arc<AtomicBool>,
    }

    #[async_trait]
    impl AudioStream for FakeStream {
        async fn next_chunk(&mut self) -> std::result::Result<Option<Bytes>, CaptureError> {
            match self.rx.recv().await {
                Some(Ok(chunk)) => Ok(Some(chunk)),
                Some(Err(error)) => Err(error),
                None => Ok(self.flush.take()),
            }
        }

        fn request_stop(&mut self) {
            self.rx.close();
        }

        fn release(&mut self) {
            self.open.store(false, Ordering::SeqCst);
        }
    }

    /// A microphone fed by the test through an unbounded channel.
    struct FakeMicrophone {
        refusal: Option<CaptureError>,
        flush: Option<Bytes>,
        open: Arc<AtomicBool>,
        opens: AtomicUsize,
        feed: Mutex<Option<mpsc::UnboundedSender<ChunkResult>>>,
    }

    impl FakeMicrophone {
        fn base() -> Self {
            Self {
                refusal: None,
                flush: None,
                open: Arc::new(AtomicBool::new(false)),
                opens: AtomicUsize::new(0),
                feed: Mutex::new(None),
            }
        }

        fn granting() -> Arc<Self> {
            Arc::new(Self::base())
        }

        /// The encoder hands out `data` when asked to stop.
        fn flushing(data: &'static [u8]) -> Arc<Self> {
            Arc::new(Self {
                flush: Some(Bytes::from_static(data)),
                ..Self::base()
            })
        }

        fn refusing(error: CaptureError) -> Arc<Self> {
            Arc::new(Self {
                refusal: Some(error),
                ..Self::base()
            })
        }

        fn is_open(&self) -> bool {
            self.open.load(Ordering::SeqCst)
        }

        fn send(&self, chunk: ChunkResult) {
            if let Some(tx) = self.feed.lock().unwrap().as_ref() {
                let _ = tx.send(chunk);
            }
        }
    }

    #[async_trait]
    impl AudioInput for FakeMicrophone {
        async fn open(&self) -> std::result::Result<Box<dyn AudioStream>, CaptureError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = &self.refusal {
                return Err(error.clone());
            }
            let (tx, rx) = mpsc::unbounded_channel();
            *self.feed.lock().unwrap() = Some(tx);
            self.open.store(true, Ordering::SeqCst);
            Ok(Box::new(FakeStream {
                rx,
                flush: self.flush.clone(),
                open: self.open.clone(),
            }))
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_record_and_stop_produces_audio_asset() {
        let mic = FakeMicrophone::granting();
        let mut controller = MediaCaptureController::new(mic.clone());

        controller.start().await.unwrap();
        assert_eq!(controller.state(), CaptureState::Recording);
        assert!(mic.is_open());

        mic.send(Ok(Bytes::from_static(b"abc")));
        mic.send(Ok(Bytes::new()));
        mic.send(Ok(Bytes::from_static(b"def")));
        tokio::time::sleep(Duration::from_millis(3500)).await;

        assert_eq!(controller.elapsed_seconds(), 3);
        assert_eq!(controller.buffered_bytes(), 6);

        let asset = controller.stop().await.unwrap();
        assert_eq!(controller.state(), CaptureState::Idle);
        assert!(!mic.is_open());
        assert_eq!(asset.kind, AssetKind::Audio);
        assert_eq!(asset.origin, AssetOrigin::Recording);
        assert_eq!(asset.mime_type, "audio/webm");
        assert_eq!(asset.payload.as_ref(), b"abcdef");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_drains_flushed_chunk() {
        let mic = FakeMicrophone::flushing(b"tail");
        let mut controller = MediaCaptureController::new(mic.clone());

        controller.start().await.unwrap();
        mic.send(Ok(Bytes::from_static(b"head-")));
        settle().await;

        let asset = controller.stop().await.unwrap();
        assert_eq!(asset.payload.as_ref(), b"head-tail");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_recording_returns_to_idle() {
        let mic = FakeMicrophone::granting();
        let mut controller = MediaCaptureController::new(mic.clone());

        controller.start().await.unwrap();
        mic.send(Ok(Bytes::new()));
        settle().await;

        let err = controller.stop().await.unwrap_err();
        assert_eq!(err, ReliveError::Capture(CaptureError::EmptyRecording));
        assert_eq!(controller.state(), CaptureState::Idle);
        assert!(!mic.is_open());
    }

    #[tokio::test]
    async fn test_permission_denied_moves_to_error() {
        let mic = FakeMicrophone::refusing(CaptureError::PermissionDenied);
        let mut controller = MediaCaptureController::new(mic.clone());

        let err = controller.start().await.unwrap_err();
        assert_eq!(err, ReliveError::Capture(CaptureError::PermissionDenied));
        assert_eq!(
            controller.state(),
            CaptureState::Error(CaptureError::PermissionDenied)
        );
        assert!(!mic.is_open());

        // Error is a resting state: start may be retried
        let _ = controller.start().await;
        assert_eq!(mic.opens.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_illegal_transitions_have_no_side_effects() {
        let mic = FakeMicrophone::granting();
        let mut controller = MediaCaptureController::new(mic.clone());

        let err = controller.stop().await.unwrap_err();
        assert!(matches!(err, ReliveError::InvalidTransition { action: "stop", .. }));
        assert_eq!(controller.state(), CaptureState::Idle);

        controller.start().await.unwrap();
        let err = controller.start().await.unwrap_err();
        assert!(matches!(err, ReliveError::InvalidTransition { action: "start", .. }));
        assert_eq!(controller.state(), CaptureState::Recording);
        assert_eq!(mic.opens.load(Ordering::SeqCst), 1);

        controller.teardown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_failure_releases_microphone() {
        let mic = FakeMicrophone::granting();
        let mut controller = MediaCaptureController::new(mic.clone());

        controller.start().await.unwrap();
        mic.send(Ok(Bytes::from_static(b"abc")));
        mic.send(Err(CaptureError::StreamFailed("encoder crashed".into())));
        settle().await;

        assert!(!mic.is_open());
        assert!(matches!(controller.state(), CaptureState::Error(CaptureError::StreamFailed(_))));

        let err = controller.stop().await.unwrap_err();
        assert!(matches!(err, ReliveError::InvalidTransition { .. }));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(controller.elapsed_seconds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_while_recording_releases_microphone() {
        let mic = FakeMicrophone::granting();
        let mut controller = MediaCaptureController::new(mic.clone());

        controller.start().await.unwrap();
        mic.send(Ok(Bytes::from_static(b"abc")));
        settle().await;

        controller.teardown().await;
        assert!(!mic.is_open());
        assert_eq!(controller.state(), CaptureState::Idle);
        assert_eq!(controller.buffered_bytes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_microphone() {
        let mic = FakeMicrophone::granting();
        let mut controller = MediaCaptureController::new(mic.clone());
        controller.start().await.unwrap();
        assert!(mic.is_open());

        drop(controller);
        settle().await;
        assert!(!mic.is_open());
    }
}
