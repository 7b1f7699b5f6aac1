use crate::error::CaptureError;

/// The observable state of a capture controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    RequestingPermission,
    Recording,
    Stopping,
    Error(CaptureError),
}

impl CaptureState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::RequestingPermission => "requesting_permission",
            Self::Recording => "recording",
            Self::Stopping => "stopping",
            Self::Error(_) => "error",
        }
    }

    /// Whether `start` may be called from this state.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Error(_))
    }
}

impl std::fmt::Display for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
