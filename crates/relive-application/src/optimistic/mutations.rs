//! Built-in optimistic mutations.

use relive_core::http::RequestSpec;
use relive_core::memory::{MemoryFeed, MemoryId, MemoryRecord};
use relive_core::{ReliveError, Result};
use relive_interaction::routes;

use super::coordinator::Mutation;

/// Likes or unlikes a memory, depending on its current state.
pub struct ToggleLike {
    pub memory_id: MemoryId,
}

/// The like state before the toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeSnapshot {
    pub is_liked: bool,
    pub likes_count: u32,
}

impl Mutation for ToggleLike {
    type Snapshot = LikeSnapshot;

    fn target(&self) -> MemoryId {
        self.memory_id
    }

    fn apply(&self, feed: &mut MemoryFeed) -> Result<LikeSnapshot> {
        let entry = feed
            .get_mut(self.memory_id)
            .ok_or_else(|| ReliveError::not_found("memory", self.memory_id.to_string()))?;
        let snapshot = LikeSnapshot {
            is_liked: entry.is_liked,
            likes_count: entry.likes_count,
        };

        entry.is_liked = !snapshot.is_liked;
        entry.likes_count = if snapshot.is_liked {
            snapshot.likes_count.saturating_sub(1)
        } else {
            snapshot.likes_count + 1
        };
        Ok(snapshot)
    }

    fn revert(&self, feed: &mut MemoryFeed, snapshot: LikeSnapshot) {
        if let Some(entry) = feed.get_mut(self.memory_id) {
            entry.is_liked = snapshot.is_liked;
            entry.likes_count = snapshot.likes_count;
        }
    }

    fn request(&self, snapshot: &LikeSnapshot) -> RequestSpec {
        if snapshot.is_liked {
            routes::unlike_memory(self.memory_id)
        } else {
            routes::like_memory(self.memory_id)
        }
    }
}

/// Removes a memory from the feed and deletes it on the server.
pub struct RemoveMemory {
    pub memory_id: MemoryId,
}

#[derive(Debug, Clone)]
pub struct RemovedEntry {
    pub index: usize,
    pub record: MemoryRecord,
}

impl Mutation for RemoveMemory {
    type Snapshot = RemovedEntry;

    fn target(&self) -> MemoryId {
        self.memory_id
    }

    fn apply(&self, feed: &mut MemoryFeed) -> Result<RemovedEntry> {
        let (index, record) = feed
            .remove(self.memory_id)
            .ok_or_else(|| ReliveError::not_found("memory", self.memory_id.to_string()))?;
        Ok(RemovedEntry { index, record })
    }

    fn revert(&self, feed: &mut MemoryFeed, snapshot: RemovedEntry) {
        feed.insert(snapshot.index, snapshot.record);
    }

    fn request(&self, _snapshot: &RemovedEntry) -> RequestSpec {
        routes::delete_memory(self.memory_id)
    }
}
