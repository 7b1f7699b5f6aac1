//! OptimisticMutationCoordinator - applies feed changes before the server confirms.

use relive_core::http::RequestSpec;
use relive_core::memory::{MemoryFeed, MemoryId, MemoryRecord};
use relive_core::{ReliveError, Result};
use relive_interaction::AuthenticatedRequestClient;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A local change with a server request that confirms it.
///
/// `apply` captures whatever `revert` needs to restore the exact previous value.
pub trait Mutation: Send + 'static {
    type Snapshot: Send + 'static;

    /// The memory this mutation changes; one pending mutation per target.
    fn target(&self) -> MemoryId;

    fn apply(&self, feed: &mut MemoryFeed) -> Result<Self::Snapshot>;

    fn revert(&self, feed: &mut MemoryFeed, snapshot: Self::Snapshot);

    /// The confirming request, given the state captured by `apply`.
    fn request(&self, snapshot: &Self::Snapshot) -> RequestSpec;
}

/// Resolves once the server has answered a mutation.
#[derive(Debug)]
pub struct MutationHandle {
    task: JoinHandle<Result<()>>,
}

impl MutationHandle {
    /// Waits for the outcome. On `Err` the feed has already been restored.
    pub async fn outcome(self) -> Result<()> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(ReliveError::Internal(format!("Mutation task failed: {}", e))),
        }
    }
}

#[derive(Clone)]
pub struct OptimisticMutationCoordinator {
    feed: Arc<Mutex<MemoryFeed>>,
    client: AuthenticatedRequestClient,
    in_flight: Arc<Mutex<HashSet<MemoryId>>>,
}

impl OptimisticMutationCoordinator {
    pub fn new(client: AuthenticatedRequestClient, feed: MemoryFeed) -> Self {
        Self {
            feed: Arc::new(Mutex::new(feed)),
            client,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// A copy of the feed as currently shown.
    pub fn feed(&self) -> MemoryFeed {
        lock(&self.feed).clone()
    }

    pub fn replace_feed(&self, entries: Vec<MemoryRecord>) {
        lock(&self.feed).replace_all(entries);
    }

    pub fn is_pending(&self, target: MemoryId) -> bool {
        lock(&self.in_flight).contains(&target)
    }

    /// Applies `mutation` to the feed now and confirms it in the background.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// - `Ok(handle)`: The change is visible; the handle resolves with the server outcome
    /// - `Err(MutationInFlight)`: Another change to the same memory is pending
    /// - `Err(_)`: The mutation could not be applied; the feed is unchanged
    pub fn apply<M: Mutation>(&self, mutation: M) -> Result<MutationHandle> {
        let target = mutation.target();
        if !lock(&self.in_flight).insert(target) {
            return Err(ReliveError::MutationInFlight(target.to_string()));
        }

        let snapshot = match mutation.apply(&mut lock(&self.feed)) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                lock(&self.in_flight).remove(&target);
                return Err(e);
            }
        };
        let spec = mutation.request(&snapshot);

        let feed = self.feed.clone();
        let in_flight = self.in_flight.clone();
        let client = self.client.clone();
        let task = tokio::spawn(async move {
            let result = client.request(spec).await.map(|_| ());
            if let Err(e) = &result {
                tracing::warn!(
                    "[Optimistic] Change to memory {} rejected, restoring: {}",
                    target,
                    e
                );
                mutation.revert(&mut lock(&feed), snapshot);
            }
            lock(&in_flight).remove(&target);
            result
        });

        Ok(MutationHandle { task })
    }
}
