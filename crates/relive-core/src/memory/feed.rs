use super::model::{MemoryId, MemoryRecord};

/// The list of memories currently shown to the user.
///
/// Optimistic mutations edit this list in place before the server confirms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFeed {
    entries: Vec<MemoryRecord>,
}

impl MemoryFeed {
    pub fn new(entries: Vec<MemoryRecord>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[MemoryRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, id: MemoryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn get(&self, id: MemoryId) -> Option<&MemoryRecord> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: MemoryId) -> Option<&mut MemoryRecord> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Removes an entry, returning it with the index it occupied.
    pub fn remove(&mut self, id: MemoryId) -> Option<(usize, MemoryRecord)> {
        let index = self.position(id)?;
        Some((index, self.entries.remove(index)))
    }

    /// Inserts at `index`, or at the end when the list has shrunk since.
    pub fn insert(&mut self, index: usize, record: MemoryRecord) {
        let index = index.min(self.entries.len());
        self.entries.insert(index, record);
    }

    pub fn replace_all(&mut self, entries: Vec<MemoryRecord>) {
        self.entries = entries;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64) -> MemoryRecord {
        MemoryRecord {
            id: MemoryId(id),
            title: format!("m{}", id),
            description: None,
            date: "2024-01-01".into(),
            location: None,
            tag: None,
            username: None,
            resolved_image_url: None,
            likes_count: 0,
            is_liked: false,
            created_at: None,
        }
    }

    #[test]
    fn test_remove_and_reinsert_keeps_order() {
        let mut feed = MemoryFeed::new(vec![record(1), record(2), record(3)]);
        let (index, removed) = feed.remove(MemoryId(2)).unwrap();
        assert_eq!(index, 1);
        assert_eq!(feed.len(), 2);

        feed.insert(index, removed);
        let ids: Vec<_> = feed.entries().iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_insert_past_end_appends() {
        let mut feed = MemoryFeed::new(vec![record(1)]);
        feed.insert(10, record(2));
        assert_eq!(feed.position(MemoryId(2)), Some(1));
    }
}
