//! Optimistic updates of the memory feed.

mod coordinator;
mod mutations;

pub use coordinator::{Mutation, MutationHandle, OptimisticMutationCoordinator};
pub use mutations::{LikeSnapshot, RemoveMemory, RemovedEntry, ToggleLike};
