//! Memory submission.

mod orchestrator;

pub use orchestrator::UploadOrchestrator;
