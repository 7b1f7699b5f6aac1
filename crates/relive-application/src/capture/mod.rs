//! Audio recording.

mod controller;

pub use controller::MediaCaptureController;
