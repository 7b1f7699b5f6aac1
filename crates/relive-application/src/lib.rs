//! Application layer for the ReLive client.
//!
//! Coordinates the domain model and the network layer: audio capture, the
//! multi-asset upload of a memory, optimistic list mutations, and
//! authentication flows.

pub mod auth_usecase;
pub mod capture;
pub mod optimistic;
pub mod upload;

pub use auth_usecase::AuthUseCase;
pub use capture::MediaCaptureController;
pub use optimistic::{MutationHandle, OptimisticMutationCoordinator};
pub use upload::UploadOrchestrator;
